use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_transformers::models::bert::BertModel;
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::vector::{
    config::{load_bert_model, load_tokenizer, EncoderConfig},
    Encoder, TARGET_VECTOR,
};

/// Sentence-transformer encoder: BERT forward pass, masked mean pooling, L2 normalization.
pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimensions: usize,
    max_length: usize,
}

impl SentenceEncoder {
    /// Download the model if needed and load it on the CPU.
    pub async fn load(config: &EncoderConfig) -> Result<Self> {
        let start = Instant::now();
        config.ensure_model_files().await?;

        let device = Device::Cpu;
        let (model, bert_config) = load_bert_model(config, &device)?;
        let mut tokenizer = load_tokenizer(config)?;

        let max_length = config
            .max_seq_length()
            .min(bert_config.max_position_embeddings);
        // Truncate in the tokenizer so the closing [SEP] survives
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        info!(
            target: TARGET_VECTOR,
            "Encoder {} ready in {:?}, truncating at {} tokens",
            config.model,
            start.elapsed(),
            max_length
        );
        Ok(Self {
            model,
            tokenizer,
            device,
            dimensions: bert_config.hidden_size,
            max_length,
        })
    }

    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<u32> = encoding
            .get_ids()
            .iter()
            .take(self.max_length)
            .copied()
            .collect();
        let attention_mask: Vec<u32> = encoding
            .get_attention_mask()
            .iter()
            .take(self.max_length)
            .copied()
            .collect();
        let token_count = input_ids.len();

        let input_ids = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(attention_mask, &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [1, tokens, hidden]
        let hidden_state = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Zero out padding positions before pooling
        let mask = attention_mask.to_dtype(DType::F32)?;
        let masked_hidden = hidden_state.broadcast_mul(&mask.unsqueeze(2)?)?;
        let summed_hidden = masked_hidden.sum(1)?;
        let valid_tokens = mask.sum(1)?.unsqueeze(1)?.clamp(1.0, f32::MAX)?;
        let mean_pooled = summed_hidden.broadcast_div(&valid_tokens)?;

        let norm = mean_pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let normalized = mean_pooled.broadcast_div(&norm)?;

        debug!(target: TARGET_VECTOR, "Encoded {} tokens from {} chars", token_count, text.len());
        Ok(normalized.squeeze(0)?.to_vec1::<f32>()?)
    }
}

impl Encoder for SentenceEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let vectors = texts
            .iter()
            .map(|text| self.embed_one(text))
            .collect::<Result<Vec<_>>>()?;

        let stats = EmbeddingStats::from_vectors(&vectors);
        info!(
            target: TARGET_VECTOR,
            "Encoded {} texts in {:?}: dimensions {}, mean magnitude {:.4}, mean active dimensions {:.1}",
            vectors.len(),
            start.elapsed(),
            self.dimensions,
            stats.mean_magnitude,
            stats.mean_active_dimensions
        );
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Summary statistics over a batch of embeddings, for the log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingStats {
    pub mean_magnitude: f32,
    pub mean_active_dimensions: f32,
}

impl EmbeddingStats {
    pub fn from_vectors(vectors: &[Vec<f32>]) -> Self {
        if vectors.is_empty() {
            return Self {
                mean_magnitude: 0.0,
                mean_active_dimensions: 0.0,
            };
        }

        let mut magnitude_total = 0.0;
        let mut active_total = 0.0;
        for vector in vectors {
            let len = vector.len().max(1) as f32;
            let mean = vector.iter().sum::<f32>() / len;
            magnitude_total += vector.iter().map(|x| x.powi(2)).sum::<f32>().sqrt();
            active_total += vector.iter().filter(|&&x| x > mean).count() as f32;
        }

        let count = vectors.len() as f32;
        Self {
            mean_magnitude: magnitude_total / count,
            mean_active_dimensions: active_total / count,
        }
    }
}
