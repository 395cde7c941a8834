//! Region-by-region feed fetching.

use anyhow::{anyhow, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::{create_http_client, fetch_feed_body};
use super::dedup::Deduplicator;
use super::parser::parse_feed;
use super::types::{FeedSource, RawArticle, RawFeedSnapshot};
use super::util::is_valid_url;
use crate::TARGET_WEB_REQUEST;

/// Fetch every source in order and collect the deduplicated articles.
///
/// A source that cannot be fetched or parsed contributes no articles; the
/// remaining sources are still processed. Only failing to build the HTTP
/// client is an error.
pub async fn fetch_feeds(sources: &[FeedSource], timeout: Duration) -> Result<RawFeedSnapshot> {
    let client = create_http_client(timeout)?;
    let mut dedup = Deduplicator::new();

    for source in sources {
        info!(target: TARGET_WEB_REQUEST, "Fetching news for region: {}", source.region);

        match fetch_region(&client, source).await {
            Ok(articles) => {
                let found = articles.len();
                let added = dedup.extend(articles);
                info!(
                    target: TARGET_WEB_REQUEST,
                    "Region {}: {} entries, {} new ({} duplicates dropped)",
                    source.region,
                    found,
                    added,
                    found - added
                );
            }
            Err(err) => {
                warn!(
                    target: TARGET_WEB_REQUEST,
                    "Source unavailable for region {} ({}): {}", source.region, source.url, err
                );
            }
        }
    }

    debug!(target: TARGET_WEB_REQUEST, "Collected {} unique articles", dedup.len());
    Ok(RawFeedSnapshot::new(dedup.into_articles()))
}

/// Fetch and parse one source.
pub async fn fetch_region(client: &reqwest::Client, source: &FeedSource) -> Result<Vec<RawArticle>> {
    if !is_valid_url(&source.url) {
        return Err(anyhow!("Invalid feed URL: {}", source.url));
    }

    let body = fetch_feed_body(client, &source.url).await?;
    parse_feed(&body, source.region)
}
