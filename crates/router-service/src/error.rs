//! Service error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use router_actions::ActionError;
use router_embeddings::EmbeddingError;
use router_retrieval::RetrievalError;
use router_vector::VectorError;
use thiserror::Error;

/// Errors from dispatching a request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Action failed: {0}")]
    Action(#[from] ActionError),

    /// Blocking retrieval task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput(_)
            | ServiceError::Retrieval(RetrievalError::Embedding(EmbeddingError::InvalidInput(_)))
            | ServiceError::Retrieval(RetrievalError::Index(
                VectorError::InvalidK(_) | VectorError::ZeroQuery,
            )) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Retrieval(RetrievalError::NotInitialized) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServiceError::Action(ActionError::UnknownAction(_)) => StatusCode::NOT_FOUND,
            ServiceError::Action(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Retrieval(_) | ServiceError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(e: tokio::task::JoinError) -> Self {
        ServiceError::Task(e.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
