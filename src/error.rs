use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds that abort a pipeline run.
///
/// Feed-level failures are not listed here: a feed that cannot be fetched or
/// parsed is logged and skipped by the ingestor.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("raw snapshot not usable at {path}: {reason}")]
    MissingInput { path: PathBuf, reason: String },

    #[error("no articles to cluster")]
    EmptyCorpus,

    #[error("encoder failure: {0}")]
    EncoderFailure(String),

    #[error("malformed vectors: {0}")]
    MalformedVectors(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
