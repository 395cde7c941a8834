//! Feed parsing for RSS and Atom documents.

use anyhow::{anyhow, Result};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use std::borrow::Cow;
use tracing::{debug, warn};

use super::item_fields::{scan_item_fields, ItemFields};
use super::types::{RawArticle, Region, DEFAULT_SOURCE};
use super::util::{cleanup_xml, looks_like_feed};
use crate::TARGET_WEB_REQUEST;

/// Parse a feed body into articles tagged with `region`, in feed order.
///
/// A body that fails to parse is cleaned up and parsed once more before
/// giving up.
pub fn parse_feed(body: &[u8], region: Region) -> Result<Vec<RawArticle>> {
    let (feed, document) = match parser::parse(body) {
        Ok(feed) => (feed, Cow::Borrowed(body)),
        Err(first_err) => {
            let text = String::from_utf8_lossy(body);
            if !looks_like_feed(&text) {
                return Err(anyhow!("Body is not an RSS or Atom document: {}", first_err));
            }
            let cleaned = cleanup_xml(&text);
            let feed = parser::parse(cleaned.as_bytes()).map_err(|second_err| {
                anyhow!(
                    "Failed to parse feed after cleanup. First error: {}. Second error: {}",
                    first_err,
                    second_err
                )
            })?;
            (feed, Cow::Owned(cleaned.into_bytes()))
        }
    };

    let fields = item_fields(&document, feed.entries.len());
    Ok(articles_from_feed(feed, fields, region))
}

/// Item fields aligned with the parsed entries. Without a clean alignment,
/// every item falls back to the defaults.
fn item_fields(document: &[u8], entries: usize) -> Vec<ItemFields> {
    match scan_item_fields(document) {
        Ok(fields) if fields.len() == entries => fields,
        Ok(fields) => {
            warn!(
                target: TARGET_WEB_REQUEST,
                "Found {} items but parsed {} entries, ignoring item sources", fields.len(), entries
            );
            vec![ItemFields::default(); entries]
        }
        Err(e) => {
            warn!(target: TARGET_WEB_REQUEST, "Failed to scan feed items: {}", e);
            vec![ItemFields::default(); entries]
        }
    }
}

fn articles_from_feed(feed: Feed, fields: Vec<ItemFields>, region: Region) -> Vec<RawArticle> {
    debug!(
        target: TARGET_WEB_REQUEST,
        "Parsed feed '{}' with {} entries",
        feed.title.as_ref().map(|t| t.content.as_str()).unwrap_or_default(),
        feed.entries.len()
    );

    feed.entries
        .into_iter()
        .zip(fields)
        .filter_map(|(entry, fields)| article_from_entry(entry, fields, region))
        .collect()
}

fn article_from_entry(entry: Entry, fields: ItemFields, region: Region) -> Option<RawArticle> {
    let link = match entry.links.first() {
        Some(link) => link.href.clone(),
        None => {
            warn!(target: TARGET_WEB_REQUEST, "Feed entry {} missing link, skipping", entry.id);
            return None;
        }
    };

    // Raw date text first, then the date feed-rs parsed
    let published = fields
        .published
        .or_else(|| entry.published.map(|d| d.to_rfc2822()))
        .unwrap_or_default();

    Some(RawArticle {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        link,
        published,
        summary: entry.summary.map(|t| t.content).unwrap_or_default(),
        source: fields.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        region,
    })
}
