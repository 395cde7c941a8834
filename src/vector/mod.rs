//! Embedding generation.
//!
//! The pipeline only depends on the [`Encoder`] trait; [`SentenceEncoder`] is
//! the production implementation backed by a BERT sentence-transformer.

// Vector embedding configuration
pub const TARGET_VECTOR: &str = "article-embeddings";
pub const HUB_URL: &str = "https://huggingface.co";
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

use anyhow::Result;

pub mod config;
pub mod embedding;
pub mod validate;

pub use config::*;
pub use embedding::*;
pub use validate::validate_embeddings;

/// Turns texts into fixed-length vectors.
///
/// Implementations must return exactly one vector per input text, in input
/// order, each of `dimensions()` length, and must be free of side effects
/// visible to the caller.
pub trait Encoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimensions(&self) -> usize;
}
