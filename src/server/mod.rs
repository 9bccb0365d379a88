//! HTTP layer: visualization requests and SSE progress streaming.

mod http;

pub use http::{ProgressEvent, VizServer};
