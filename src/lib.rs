pub mod api;
pub mod clustering;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod rss;
pub mod snapshot;
pub mod text;
pub mod vector;

pub use config::PipelineConfig;
pub use error::PipelineError;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_CLUSTERING: &str = "clustering";
pub const TARGET_SNAPSHOT: &str = "snapshot";
