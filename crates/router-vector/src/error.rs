//! Vector index error types.

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VectorError {
    /// Build called with no entries
    #[error("Cannot build an index from zero entries")]
    EmptyIndex,

    /// Build called with zero-length vectors
    #[error("Cannot index zero-length vectors")]
    EmptyVector,

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// NaN or infinite component in an indexed vector
    #[error("Non-finite value in vector at position {0}")]
    NonFiniteValue(usize),

    /// All-zero vector at this position; it has no direction to match on
    #[error("Zero vector at position {0}")]
    ZeroVector(usize),

    /// All-zero query, equidistant from every unit-length entry
    #[error("Query vector is all zeros")]
    ZeroQuery,

    /// Search before build
    #[error("Index has not been built")]
    NotBuilt,

    /// Non-positive k
    #[error("Invalid k: {0} (must be >= 1)")]
    InvalidK(usize),
}

impl VectorError {
    /// Whether this error came from rejecting the entries passed to `build`.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            VectorError::EmptyIndex
                | VectorError::EmptyVector
                | VectorError::DimensionMismatch { .. }
                | VectorError::NonFiniteValue(_)
                | VectorError::ZeroVector(_)
        )
    }
}
