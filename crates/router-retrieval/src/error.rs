//! Retrieval error types.

use router_embeddings::EmbeddingError;
use router_vector::VectorError;
use thiserror::Error;

/// Errors surfaced by [`Retriever`](crate::Retriever).
///
/// Embedding and index failures pass through unchanged; nothing here maps a
/// failure onto a fallback action.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Initialization with zero actions
    #[error("Action catalog is empty")]
    CatalogEmpty,

    /// Resolve before initialize
    #[error("Retriever has not been initialized")]
    NotInitialized,

    /// Batch embedding returned the wrong number of vectors
    #[error("Embedder returned {actual} vectors for {expected} descriptions")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] VectorError),
}
