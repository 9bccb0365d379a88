pub mod config;
pub mod error;
pub mod db;
pub mod preprocess;
pub mod graph;
pub mod viz;
pub mod cache;
pub mod server;

pub use config::Config;
pub use error::{LexigraphError, Result};
pub use graph::{build_graph, extract_neighborhood, Directions, Neighborhood, RelationGraph};
pub use viz::{project, ProgressSink, VizPayload};
