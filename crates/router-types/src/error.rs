//! Error types for the action router.

use thiserror::Error;

/// Unified error type for shared router types.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Two catalog entries share an identifier
    #[error("Duplicate action identifier: {0}")]
    DuplicateAction(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
