//! # router-codegen
//!
//! Asks a remote language model for a short snippet that invokes the
//! matched action. The snippet is informational: the dispatcher runs the
//! action through its registry whether or not generation succeeds.
//!
//! - [`ApiCodeGenerator`]: OpenAI-compatible `/chat/completions` client with
//!   bounded exponential-backoff retries
//! - [`MockCodeGenerator`]: deterministic output for tests

mod api;
mod mock;

pub use api::{ApiCodeGenerator, ApiCodeGeneratorConfig};
pub use mock::MockCodeGenerator;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for code generation.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Missing API key for code generation")]
    MissingApiKey,

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl CodegenError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CodegenError::RateLimitExceeded | CodegenError::ServerError(_)
        )
    }
}

/// Produces a code snippet for an action identifier.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    async fn generate(&self, action_id: &str) -> Result<String, CodegenError>;
}
