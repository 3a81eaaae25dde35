//! Candle-based embedding implementation.
//!
//! Runs a BERT sentence-transformer (all-MiniLM-L6-v2 by default, 384
//! dimensions) on the CPU. Token embeddings are mean-pooled over the
//! attention mask and L2-normalized.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use router_types::EmbedderSettings;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{ensure_text, Embedding, EmbeddingModel, ModelInfo};

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Maximum sequence length
pub const MAX_SEQ_LENGTH: usize = 256;

/// Candle-based sentence embedder.
///
/// Loading reads the weights once; every later `embed` call only pays for a
/// forward pass.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
}

impl CandleEmbedder {
    /// Load the embedding model from cache (downloading if needed).
    pub fn load(cache: &ModelCache) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        let name = cache
            .repo_id
            .rsplit('/')
            .next()
            .unwrap_or(cache.repo_id.as_str())
            .to_string();
        Self::load_from_paths(&name, &paths.config, &paths.tokenizer, &paths.weights)
    }

    /// Load all-MiniLM-L6-v2 from the default cache directory.
    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(&ModelCache::from_settings(&EmbedderSettings::default()))
    }

    /// Load from explicit file paths
    pub fn load_from_paths(
        name: &str,
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        info!(model = name, "Loading embedding model...");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
        let dimension = hidden_size(&config_str)?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        // SAFETY: the safetensors file is owned by the model cache and is not
        // modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };

        let model = BertModel::load(vb, &config)?;

        info!(
            model = name,
            dim = dimension,
            max_seq = MAX_SEQ_LENGTH,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: name.to_string(),
                dimension,
                max_sequence_length: MAX_SEQ_LENGTH,
            },
        })
    }

    /// Mean pooling over token embeddings (excluding padding)
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?;
        let mask_f32 = mask.to_dtype(DType::F32)?;

        let masked = embeddings.broadcast_mul(&mask_f32)?;
        let sum = masked.sum(1)?;

        let mask_sum = mask_f32.sum(1)?;
        let mask_sum = mask_sum.clamp(1e-9, f64::MAX)?;

        Ok(sum.broadcast_div(&mask_sum)?)
    }

    /// Tokenize, pad to the longest sequence in the batch (capped at
    /// `MAX_SEQ_LENGTH`) and return `(input_ids, attention_mask)` tensors.
    fn encode(&self, texts: &[&str]) -> Result<(Tensor, Tensor), EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(MAX_SEQ_LENGTH);

        let mut ids_flat: Vec<u32> = Vec::with_capacity(texts.len() * max_len);
        let mut mask_flat: Vec<u32> = Vec::with_capacity(texts.len() * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let len = ids.len().min(max_len);

            ids_flat.extend_from_slice(&ids[..len]);
            ids_flat.extend(std::iter::repeat(0).take(max_len - len));
            mask_flat.extend_from_slice(&mask[..len]);
            mask_flat.extend(std::iter::repeat(0).take(max_len - len));
        }

        let shape = (texts.len(), max_len);
        let input_ids = Tensor::from_vec(ids_flat, shape, &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, shape, &self.device)?;
        Ok((input_ids, attention_mask))
    }
}

/// Read `hidden_size` (the pooled vector length) from a BERT config.json.
fn hidden_size(config_json: &str) -> Result<usize, EmbeddingError> {
    let value: serde_json::Value = serde_json::from_str(config_json)
        .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
    value
        .get("hidden_size")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| EmbeddingError::ModelNotFound("config has no hidden_size".to_string()))
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyOutput)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        for text in texts {
            ensure_text(text)?;
        }

        debug!(count = texts.len(), "Embedding batch");

        let (input_ids, attention_mask) = self.encode(texts)?;
        let token_type_ids = input_ids.zeros_like()?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = self.mean_pooling(&output, &attention_mask)?;
        let pooled_vec: Vec<Vec<f32>> = pooled.to_vec2()?;

        let embeddings: Vec<Embedding> = pooled_vec.into_iter().map(Embedding::new).collect();

        debug!(
            count = embeddings.len(),
            dim = self.info.dimension,
            "Batch complete"
        );

        Ok(embeddings)
    }
}
