//! Prompt dispatch: resolve, generate a snippet, run the action.

use std::sync::Arc;

use router_actions::ActionRegistry;
use router_codegen::CodeGenerator;
use router_retrieval::{RetrievalError, Retriever, SearchResult};
use router_types::ActionDescriptor;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ServiceError;

/// Result text for actions that produce no output.
pub const DEFAULT_EXECUTION_MESSAGE: &str = "Function executed successfully.";

/// Outcome of [`Dispatcher::execute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub prompt: String,
    pub matched_function: String,
    pub distance: f32,
    pub execution_result: String,
    pub generated_code_snippet: Option<String>,
    /// Why no snippet was generated, when generation failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet_error: Option<String>,
}

/// Routes prompts to registered actions.
///
/// Holds the shared retriever and the registry it was initialized from.
/// Construct once and share as `Arc<Dispatcher>`.
pub struct Dispatcher {
    retriever: Arc<Retriever>,
    registry: Arc<ActionRegistry>,
    codegen: Option<Arc<dyn CodeGenerator>>,
}

impl Dispatcher {
    pub fn new(retriever: Arc<Retriever>, registry: Arc<ActionRegistry>) -> Self {
        Self {
            retriever,
            registry,
            codegen: None,
        }
    }

    /// Attach a snippet generator.
    pub fn with_code_generator(mut self, codegen: Arc<dyn CodeGenerator>) -> Self {
        self.codegen = Some(codegen);
        self
    }

    /// Embed the registry's catalog and publish the index.
    pub async fn initialize(&self) -> Result<(), ServiceError> {
        let retriever = Arc::clone(&self.retriever);
        let catalog = self.registry.catalog();
        tokio::task::spawn_blocking(move || retriever.initialize(catalog.descriptors()))
            .await??;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.retriever.is_initialized()
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Actions in registration order.
    pub fn actions(&self) -> Vec<ActionDescriptor> {
        self.registry.catalog().descriptors().to_vec()
    }

    /// Nearest `top_k` actions for `query`, nearest first.
    pub async fn resolve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let retriever = Arc::clone(&self.retriever);
        let query = query.to_string();
        let results =
            tokio::task::spawn_blocking(move || retriever.resolve(&query, top_k)).await??;
        Ok(results)
    }

    /// Route `prompt` to its nearest action and run it.
    ///
    /// Snippet generation failures are reported in the returned
    /// [`ExecutionReport`]; they never stop the action from running.
    pub async fn execute(&self, prompt: &str) -> Result<ExecutionReport, ServiceError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ServiceError::InvalidInput("prompt is empty".to_string()));
        }

        let best = self
            .resolve(prompt, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(RetrievalError::NotInitialized)?;
        let matched = best.identifier().to_string();

        info!(prompt, matched_function = %matched, distance = best.distance, "Matched prompt");

        let (snippet, outcome) = tokio::join!(
            self.snippet(&matched),
            self.registry.dispatch(&matched)
        );

        let output = outcome.inspect_err(|e| {
            error!(action = %matched, error = %e, "Action failed");
        })?;

        let (generated_code_snippet, snippet_error) = match snippet {
            Some(Ok(code)) => (Some(code), None),
            Some(Err(message)) => (None, Some(message)),
            None => (None, None),
        };

        Ok(ExecutionReport {
            prompt: prompt.to_string(),
            matched_function: matched,
            distance: best.distance,
            execution_result: output.message_or(DEFAULT_EXECUTION_MESSAGE),
            generated_code_snippet,
            snippet_error,
        })
    }

    async fn snippet(&self, action_id: &str) -> Option<Result<String, String>> {
        let codegen = self.codegen.as_ref()?;
        Some(codegen.generate(action_id).await.map_err(|e| {
            warn!(action = action_id, error = %e, "Code generation failed");
            e.to_string()
        }))
    }
}
