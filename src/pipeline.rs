//! The two batch entry points: `ingest` (feeds → raw snapshot) and
//! `process` (raw snapshot → processed snapshot).

use anyhow::Result;
use std::time::Instant;
use tracing::info;

use crate::clustering;
use crate::rss::{self, RawFeedSnapshot};
use crate::snapshot::{build_snapshot, load_raw_snapshot, write_json_atomic, ProcessedSnapshot};
use crate::text::embedding_texts;
use crate::vector::{validate_embeddings, Encoder};
use crate::{PipelineConfig, PipelineError};

/// Fetch all configured feeds in order and persist the deduplicated raw snapshot.
///
/// Unreachable feeds are skipped; failing to write the snapshot is an error.
pub async fn ingest(config: &PipelineConfig) -> Result<RawFeedSnapshot> {
    let start = Instant::now();
    let snapshot = rss::fetch_feeds(&config.feeds, config.feed_timeout).await?;
    write_json_atomic(&config.raw_snapshot_path, &snapshot)?;

    info!(
        "Fetched {} unique articles across {} feeds in {:?}",
        snapshot.total_articles,
        config.feeds.len(),
        start.elapsed()
    );
    Ok(snapshot)
}

/// Load the raw snapshot and check there is something to cluster.
///
/// Runs before the encoder is loaded, so a missing or empty corpus is
/// reported as such even when the model is unavailable.
pub fn load_corpus(config: &PipelineConfig) -> Result<RawFeedSnapshot> {
    info!("Loading articles from {}", config.raw_snapshot_path.display());
    let raw = load_raw_snapshot(&config.raw_snapshot_path)?;
    if raw.articles.is_empty() {
        return Err(PipelineError::EmptyCorpus.into());
    }
    Ok(raw)
}

/// Embed, cluster and persist the raw snapshot.
///
/// Any failure returns before the processed snapshot is written, so a
/// previous snapshot survives a failed run.
pub fn process(config: &PipelineConfig, encoder: &dyn Encoder) -> Result<ProcessedSnapshot> {
    let raw = load_corpus(config)?;
    cluster_corpus(config, &raw, encoder)
}

/// The part of [`process`] after loading: encode, cluster, write.
pub fn cluster_corpus(
    config: &PipelineConfig,
    raw: &RawFeedSnapshot,
    encoder: &dyn Encoder,
) -> Result<ProcessedSnapshot> {
    let start = Instant::now();
    let k = config.clustering.k;
    if raw.articles.is_empty() {
        return Err(PipelineError::EmptyCorpus.into());
    }

    info!("Preparing text for {} articles", raw.articles.len());
    let texts = embedding_texts(&raw.articles);

    info!("Generating embeddings");
    let vectors = encoder
        .encode(&texts)
        .map_err(|e| PipelineError::EncoderFailure(format!("{:#}", e)))?;
    validate_embeddings(&vectors, texts.len(), encoder.dimensions())?;

    info!("Clustering articles into {} groups", k);
    let labels = clustering::cluster(&vectors, &config.clustering)?;

    let snapshot = build_snapshot(&raw.articles, &labels, k)?;
    write_json_atomic(&config.processed_snapshot_path, &snapshot)?;

    info!(
        "News clustering completed at {}: {} articles, {} of {} groups populated, {:?}",
        snapshot.generated_at,
        snapshot.total_articles,
        snapshot.populated_groups(),
        k,
        start.elapsed()
    );
    Ok(snapshot)
}
