//! Feed ingestion: fetching, parsing and cross-region deduplication.

mod client;
mod dedup;
mod fetcher;
mod item_fields;
mod parser;
mod types;
mod util;

pub use self::client::{create_http_client, fetch_feed_body};
pub use self::dedup::Deduplicator;
pub use self::fetcher::{fetch_feeds, fetch_region};
pub use self::item_fields::{scan_item_fields, ItemFields};
pub use self::parser::parse_feed;
pub use self::types::*;
pub use self::util::{cleanup_xml, is_valid_url, looks_like_feed};
