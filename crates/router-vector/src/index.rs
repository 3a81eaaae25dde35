//! Vector index trait and types.
//!
//! Defines the interface for nearest-neighbor search over action embeddings.

use router_embeddings::Embedding;
use router_types::ActionDescriptor;

use crate::error::VectorError;

/// One catalog action and its embedding.
///
/// Descriptor and vector travel together; position in the index is never
/// used as a join key.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub descriptor: ActionDescriptor,
    pub vector: Embedding,
}

impl IndexEntry {
    pub fn new(descriptor: ActionDescriptor, vector: Embedding) -> Self {
        Self { descriptor, vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.dimension()
    }
}

/// Result of a vector search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub descriptor: ActionDescriptor,
    /// Squared L2 distance to the query (lower = more similar)
    pub distance: f32,
}

impl SearchResult {
    pub fn new(descriptor: ActionDescriptor, distance: f32) -> Self {
        Self {
            descriptor,
            distance,
        }
    }

    pub fn identifier(&self) -> &str {
        self.descriptor.identifier()
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of entries in the index
    pub entry_count: usize,
    /// Embedding dimension (0 until built)
    pub dimension: usize,
    /// Whether build has succeeded at least once
    pub built: bool,
}

/// Trait for vector indexes.
///
/// Implementations must be thread-safe for concurrent read access.
pub trait VectorIndex: Send + Sync {
    /// Embedding dimension, `None` until built
    fn dimension(&self) -> Option<usize>;

    /// Number of entries in the index
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_built(&self) -> bool {
        self.dimension().is_some()
    }

    /// Replace the contents of the index.
    ///
    /// Fails on an empty entry list or inconsistent dimensionality; on
    /// failure the previous contents are kept.
    fn build(&mut self, entries: Vec<IndexEntry>) -> Result<(), VectorError>;

    /// Search for the k nearest neighbors.
    /// Returns results sorted by ascending distance, ties in insertion order.
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError>;

    /// Get index statistics
    fn stats(&self) -> IndexStats {
        IndexStats {
            entry_count: self.len(),
            dimension: self.dimension().unwrap_or(0),
            built: self.is_built(),
        }
    }
}
