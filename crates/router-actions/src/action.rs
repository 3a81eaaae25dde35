//! Action trait, output and errors.

use async_trait::async_trait;
use router_types::RouterError;
use thiserror::Error;

/// What an action returned. Launch-style actions return no message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    pub message: Option<String>,
}

impl ActionOutput {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The message, or `fallback` when the action produced none (or only
    /// whitespace).
    pub fn message_or(&self, fallback: &str) -> String {
        match &self.message {
            Some(m) if !m.trim().is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Errors raised while looking up or running an action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No action registered under this identifier
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// Identifier registered twice
    #[error("Action already registered: {0}")]
    Duplicate(String),

    /// Program could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Command ran but exited unsuccessfully
    #[error("Command exited with {status}: {stderr}")]
    Command { status: String, stderr: String },

    /// Action needs configuration that was not supplied
    #[error("Action not configured: {0}")]
    NotConfigured(String),

    /// Invalid descriptor
    #[error(transparent)]
    Catalog(#[from] RouterError),
}

/// A single invocable action.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self) -> Result<ActionOutput, ActionError>;
}
