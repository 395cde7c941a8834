//! Processed snapshot construction and persistence.

mod builder;
mod storage;
mod types;

pub use self::builder::build_snapshot;
pub use self::storage::{load_raw_snapshot, write_json_atomic};
pub use self::types::*;
