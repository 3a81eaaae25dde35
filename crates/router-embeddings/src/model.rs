//! Embedding model trait and types.
//!
//! Defines the interface for generating vector embeddings from text.

use crate::error::EmbeddingError;

/// Vector embedding - a normalized float array.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The embedding vector (normalized to unit length)
    pub values: Vec<f32>,
}

impl Embedding {
    /// Create a new embedding from a vector.
    /// Normalizes the vector to unit length.
    pub fn new(values: Vec<f32>) -> Self {
        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        let normalized = if norm > 0.0 {
            values.iter().map(|x| x / norm).collect()
        } else {
            values
        };
        Self { values: normalized }
    }

    /// Create embedding without normalization (for pre-normalized vectors)
    pub fn from_normalized(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Embedding dimension
    pub dimension: usize,
    /// Maximum sequence length in tokens
    pub max_sequence_length: usize,
}

/// Reject empty or whitespace-only input before it reaches a backend.
pub fn ensure_text(text: &str) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        return Err(EmbeddingError::InvalidInput(
            "cannot embed empty text".to_string(),
        ));
    }
    Ok(())
}

/// Trait for embedding models.
///
/// Implementations must be thread-safe (Send + Sync) for concurrent use,
/// deterministic for a fixed configuration, and must pay any model-load cost
/// at construction rather than per call.
pub trait EmbeddingModel: Send + Sync {
    /// Get model information
    fn info(&self) -> &ModelInfo;

    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Generate embeddings for multiple texts (batch).
    /// Default implementation calls embed() for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
