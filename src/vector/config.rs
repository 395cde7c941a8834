use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use tokio::fs;
use tracing::{error, info, warn};

use crate::vector::{HUB_URL, TARGET_VECTOR};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";
const SENTENCE_CONFIG_FILE: &str = "sentence_bert_config.json";

/// Token limit of sentence-transformers models that do not declare one.
pub const DEFAULT_MAX_SEQ_LENGTH: usize = 256;

/// Where the encoder model comes from and where it is cached locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Hub repository id, e.g. `sentence-transformers/all-MiniLM-L6-v2`.
    pub model: String,
    /// Directory holding one sub-directory per downloaded model.
    pub model_dir: PathBuf,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model: crate::vector::DEFAULT_MODEL.to_string(),
            model_dir: PathBuf::from("models"),
        }
    }
}

impl EncoderConfig {
    /// Local directory for this model; `/` in the repo id becomes `--`.
    pub fn local_dir(&self) -> PathBuf {
        self.model_dir.join(self.model.replace('/', "--"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.local_dir().join(CONFIG_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.local_dir().join(TOKENIZER_FILE)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.local_dir().join(WEIGHTS_FILE)
    }

    pub fn sentence_config_path(&self) -> PathBuf {
        self.local_dir().join(SENTENCE_CONFIG_FILE)
    }

    fn file_url(&self, file: &str) -> String {
        format!("{}/{}/resolve/main/{}", HUB_URL, self.model, file)
    }

    /// Download any model file that is not cached yet.
    pub async fn ensure_model_files(&self) -> Result<()> {
        let dir = self.local_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }

        for file in [CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE] {
            let path = dir.join(file);
            if path.exists() {
                continue;
            }
            let url = self.file_url(file);
            info!(target: TARGET_VECTOR, "Downloading {} from {}", file, url);
            let bytes = fetch_file(&url).await?;
            fs::write(&path, bytes).await?;
            info!(target: TARGET_VECTOR, "Downloaded {} to {}", file, path.display());
        }

        // Optional: plain BERT repositories ship without it
        let path = dir.join(SENTENCE_CONFIG_FILE);
        if !path.exists() {
            let url = self.file_url(SENTENCE_CONFIG_FILE);
            match fetch_file(&url).await {
                Ok(bytes) => fs::write(&path, bytes).await?,
                Err(e) => warn!(target: TARGET_VECTOR, "No {} for {}: {}", SENTENCE_CONFIG_FILE, self.model, e),
            }
        }

        Ok(())
    }

    /// Token limit the model was trained with, from `sentence_bert_config.json`.
    pub fn max_seq_length(&self) -> usize {
        read_max_seq_length(&self.sentence_config_path()).unwrap_or(DEFAULT_MAX_SEQ_LENGTH)
    }
}

async fn fetch_file(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

fn read_max_seq_length(path: &Path) -> Option<usize> {
    let raw = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    value
        .get("max_seq_length")?
        .as_u64()
        .map(|length| length as usize)
        .filter(|&length| length > 0)
}

/// Load the BERT weights described by the cached `config.json`.
pub fn load_bert_model(config: &EncoderConfig, device: &Device) -> Result<(BertModel, BertConfig)> {
    info!(target: TARGET_VECTOR, "Loading encoder model from {}", config.local_dir().display());

    let bert_config = read_bert_config(&config.config_path())?;

    let tensors = match candle_core::safetensors::load_buffer(
        &std::fs::read(config.weights_path())?,
        device,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(target: TARGET_VECTOR, "Failed to load model tensors: {}", e);
            return Err(anyhow!("Failed to load model tensors: {}", e));
        }
    };

    let vb = VarBuilder::from_tensors(tensors, DType::F32, device);

    let model = match BertModel::load(vb, &bert_config) {
        Ok(m) => m,
        Err(e) => {
            error!(target: TARGET_VECTOR, "Failed to load BERT model: {}", e);
            return Err(anyhow!("Failed to load BERT model: {}", e));
        }
    };

    info!(
        target: TARGET_VECTOR,
        "Loaded {} ({} layers, {} dimensions)",
        config.model,
        bert_config.num_hidden_layers,
        bert_config.hidden_size
    );
    Ok((model, bert_config))
}

pub fn load_tokenizer(config: &EncoderConfig) -> Result<Tokenizer> {
    Tokenizer::from_file(config.tokenizer_path()).map_err(|e| {
        error!(target: TARGET_VECTOR, "Failed to load tokenizer: {}", e);
        anyhow!("Failed to load tokenizer: {}", e)
    })
}

fn read_bert_config(path: &Path) -> Result<BertConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_paths() {
        let config = EncoderConfig {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            model_dir: PathBuf::from("/tmp/models"),
        };
        assert_eq!(
            config.weights_path(),
            PathBuf::from("/tmp/models/sentence-transformers--all-MiniLM-L6-v2/model.safetensors")
        );
        assert_eq!(
            config.file_url(TOKENIZER_FILE),
            "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json"
        );
    }

    #[test]
    fn test_max_seq_length() {
        let dir = tempfile::tempdir().unwrap();
        let config = EncoderConfig {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            model_dir: dir.path().to_path_buf(),
        };
        assert_eq!(config.max_seq_length(), DEFAULT_MAX_SEQ_LENGTH);

        std::fs::create_dir_all(config.local_dir()).unwrap();
        std::fs::write(
            config.sentence_config_path(),
            r#"{"max_seq_length": 128, "do_lower_case": false}"#,
        )
        .unwrap();
        assert_eq!(config.max_seq_length(), 128);

        std::fs::write(config.sentence_config_path(), r#"{"do_lower_case": false}"#).unwrap();
        assert_eq!(config.max_seq_length(), DEFAULT_MAX_SEQ_LENGTH);
    }
}
