//! Run configuration, threaded explicitly through every pipeline stage.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::clustering::KMeansConfig;
use crate::environment::{get_env_var, get_env_var_as_vec, parse_env_var};
use crate::rss::{FeedSource, Region};
use crate::vector::EncoderConfig;
use crate::PipelineError;

pub const DEFAULT_RAW_SNAPSHOT_PATH: &str = "data/news_raw.json";
pub const DEFAULT_PROCESSED_SNAPSHOT_PATH: &str = "data/processed_news.json";
pub const DEFAULT_FEED_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_API_ADDR: &str = "0.0.0.0:5000";

/// Region-wise Google News feeds, in fetch order.
pub const DEFAULT_FEEDS: [(Region, &str); 5] = [
    (Region::Global, "https://news.google.com/rss?hl=en&gl=US&ceid=US:en"),
    (Region::India, "https://news.google.com/rss?hl=en-IN&gl=IN&ceid=IN:en"),
    (Region::Us, "https://news.google.com/rss?hl=en-US&gl=US&ceid=US:en"),
    (Region::Europe, "https://news.google.com/rss?hl=en-GB&gl=GB&ceid=GB:en"),
    (Region::Asia, "https://news.google.com/rss?hl=en-SG&gl=SG&ceid=SG:en"),
];

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub feeds: Vec<FeedSource>,
    pub feed_timeout: Duration,
    pub clustering: KMeansConfig,
    pub encoder: EncoderConfig,
    pub raw_snapshot_path: PathBuf,
    pub processed_snapshot_path: PathBuf,
    pub api_addr: SocketAddr,
    /// When set, the read API proxies this URL instead of reading the local file.
    pub mirror_url: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS
                .iter()
                .map(|(region, url)| FeedSource::new(*region, *url))
                .collect(),
            feed_timeout: DEFAULT_FEED_TIMEOUT,
            clustering: KMeansConfig::default(),
            encoder: EncoderConfig::default(),
            raw_snapshot_path: PathBuf::from(DEFAULT_RAW_SNAPSHOT_PATH),
            processed_snapshot_path: PathBuf::from(DEFAULT_PROCESSED_SNAPSHOT_PATH),
            api_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            mirror_url: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by any set, non-empty environment variable.
    ///
    /// Not validated here: command-line overrides still apply on top, so call
    /// [`PipelineConfig::validate`] once they have.
    pub fn from_env() -> Result<Self, PipelineError> {
        let mut config = Self::default();

        let feeds = get_env_var_as_vec("NEWS_FEEDS", ';');
        if !feeds.is_empty() {
            config.feeds = parse_feed_list(&feeds)?;
        }
        if let Some(secs) = parse_env_var::<u64>("FEED_TIMEOUT_SECS")? {
            config.feed_timeout = Duration::from_secs(secs);
        }
        if let Some(k) = parse_env_var::<usize>("CLUSTER_COUNT")? {
            config.clustering.k = k;
        }
        if let Some(seed) = parse_env_var::<u64>("CLUSTER_SEED")? {
            config.clustering.seed = seed;
        }
        if let Some(n_init) = parse_env_var::<usize>("CLUSTER_N_INIT")? {
            config.clustering.n_init = n_init;
        }
        if let Some(max_iter) = parse_env_var::<usize>("CLUSTER_MAX_ITER")? {
            config.clustering.max_iter = max_iter;
        }
        if let Some(model) = get_env_var("EMBEDDING_MODEL") {
            config.encoder.model = model;
        }
        if let Some(dir) = get_env_var("EMBEDDING_MODEL_DIR") {
            config.encoder.model_dir = PathBuf::from(dir);
        }
        if let Some(path) = get_env_var("RAW_SNAPSHOT_PATH") {
            config.raw_snapshot_path = PathBuf::from(path);
        }
        if let Some(path) = get_env_var("PROCESSED_SNAPSHOT_PATH") {
            config.processed_snapshot_path = PathBuf::from(path);
        }
        if let Some(addr) = parse_env_var::<SocketAddr>("API_ADDR")? {
            config.api_addr = addr;
        }
        config.mirror_url = get_env_var("SNAPSHOT_MIRROR_URL");

        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.clustering.k == 0 {
            return Err(PipelineError::Config("cluster count must be at least 1".into()));
        }
        if self.clustering.n_init == 0 {
            return Err(PipelineError::Config(
                "initialization attempts must be at least 1".into(),
            ));
        }
        if self.feed_timeout.is_zero() {
            return Err(PipelineError::Config("feed timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Parse `REGION=url` pairs, keeping their order.
pub fn parse_feed_list(entries: &[String]) -> Result<Vec<FeedSource>, PipelineError> {
    entries
        .iter()
        .map(|entry| {
            let (region, url) = entry.split_once('=').ok_or_else(|| {
                PipelineError::Config(format!("feed entry {:?} is not REGION=url", entry))
            })?;
            let region = region.parse::<Region>().map_err(PipelineError::Config)?;
            let url = url.trim();
            if url.is_empty() {
                return Err(PipelineError::Config(format!("feed entry {:?} has no url", entry)));
            }
            Ok(FeedSource::new(region, url))
        })
        .collect()
}
