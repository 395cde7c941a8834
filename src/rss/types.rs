//! Type definitions for the feed ingestor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source label used when a feed does not declare a title.
pub const DEFAULT_SOURCE: &str = "Google News";

/// Source label for stored articles that lost their source field.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Geographic tag of the feed an article was first seen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    #[default]
    Global,
    India,
    Us,
    Europe,
    Asia,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Global,
        Region::India,
        Region::Us,
        Region::Europe,
        Region::Asia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Global => "GLOBAL",
            Region::India => "INDIA",
            Region::Us => "US",
            Region::Europe => "EUROPE",
            Region::Asia => "ASIA",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|region| region.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown region {:?}", s))
    }
}

/// A region-tagged feed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub region: Region,
    pub url: String,
}

impl FeedSource {
    pub fn new(region: Region, url: impl Into<String>) -> Self {
        Self {
            region,
            url: url.into(),
        }
    }
}

/// One article as pulled from a feed, keyed by `link`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub region: Region,
}

fn unknown_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

/// The persisted result of one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeedSnapshot {
    #[serde(rename = "last_updated_utc")]
    pub generated_at: String,
    pub total_articles: usize,
    pub articles: Vec<RawArticle>,
}

impl RawFeedSnapshot {
    /// Stamps `articles` with the current time.
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_articles: articles.len(),
            articles,
        }
    }
}
