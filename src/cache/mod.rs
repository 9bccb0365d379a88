mod viz_cache;

pub use viz_cache::{VizCache, VizCacheKey};
