//! HTTP client creation and request handling for feeds.

use anyhow::{anyhow, Result};
use reqwest::header;
use std::time::Duration;
use tracing::debug;

use crate::TARGET_WEB_REQUEST;

const USER_AGENT: &str = concat!("newsroom/", env!("CARGO_PKG_VERSION"));
const FEED_ACCEPT: &str =
    "application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9";

/// Create the client shared by every feed fetch in a run.
///
/// `timeout` bounds each whole request, connect through body.
pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client> {
    debug!(target: TARGET_WEB_REQUEST, "Creating HTTP client with {:?} timeout", timeout);
    reqwest::Client::builder()
        .timeout(timeout)
        .gzip(true)
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Fetch a feed body. Non-success statuses are errors; nothing is retried.
pub async fn fetch_feed_body(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting feed {}", url);

    let response = client
        .get(url)
        .header(header::ACCEPT, FEED_ACCEPT)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request to {} timed out", url)
            } else {
                anyhow!("Request to {} failed: {}", url, e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Non-success status {} from {}", status, url));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to read response body from {}: {}", url, e))?;
    debug!(target: TARGET_WEB_REQUEST, "Received {} bytes from {}", bytes.len(), url);

    Ok(bytes.to_vec())
}
