//! End-to-end test infrastructure for the action router.
//!
//! Provides a shared [`TestHarness`] that wires a retriever, a registry of
//! recording actions and a dispatcher together, so tests can check which
//! action a prompt actually ran.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use router_actions::{Action, ActionError, ActionOutput, ActionRegistry};
use router_codegen::CodeGenerator;
use router_embeddings::{EmbeddingModel, HashingEmbedder};
use router_retrieval::Retriever;
use router_service::Dispatcher;
use router_types::ActionCatalog;

/// Descriptions of the built-in actions, in registration order.
pub const BUILTIN_CATALOG: [(&str, &str); 4] = [
    (
        "open_calculator",
        "Open the calculator application on the system.",
    ),
    ("open_chrome", "Open Google Chrome to the home page."),
    (
        "check_ram_usage",
        "Check the system RAM usage and return it as a percentage.",
    ),
    (
        "run_shell_command",
        "Run a provided shell command and return its output.",
    ),
];

/// Two-action catalog used by the routing examples.
pub const EXAMPLE_CATALOG: [(&str, &str); 2] = [
    (
        "open_calculator",
        "Open the calculator application on the system.",
    ),
    (
        "check_ram",
        "Check the system RAM usage and return it as a percentage.",
    ),
];

/// Dimension used for hashing-embedder tests.
pub const HASHING_DIMENSION: usize = 1024;

/// Shared log of invoked action identifiers.
pub type InvocationLog = Arc<Mutex<Vec<String>>>;

/// Action that records its identifier instead of touching the system.
pub struct RecordingAction {
    identifier: String,
    log: InvocationLog,
}

#[async_trait]
impl Action for RecordingAction {
    async fn execute(&self) -> Result<ActionOutput, ActionError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(self.identifier.clone());
        Ok(ActionOutput::text(format!("ran {}", self.identifier)))
    }
}

/// Shared test harness for E2E tests.
pub struct TestHarness {
    pub catalog: ActionCatalog,
    pub retriever: Arc<Retriever>,
    pub dispatcher: Arc<Dispatcher>,
    log: InvocationLog,
}

impl TestHarness {
    /// Harness over `pairs` with the hashing embedder.
    pub fn hashing(pairs: &[(&str, &str)]) -> Self {
        let embedder = HashingEmbedder::new(HASHING_DIMENSION).expect("valid dimension");
        Self::with_embedder(pairs, Arc::new(embedder), None)
    }

    /// Harness over `pairs` with any embedder and optional code generator.
    pub fn with_embedder(
        pairs: &[(&str, &str)],
        embedder: Arc<dyn EmbeddingModel>,
        codegen: Option<Arc<dyn CodeGenerator>>,
    ) -> Self {
        let catalog =
            ActionCatalog::from_pairs(pairs.iter().copied()).expect("Failed to build catalog");
        let log: InvocationLog = Arc::new(Mutex::new(Vec::new()));

        let mut registry = ActionRegistry::new();
        for descriptor in catalog.iter() {
            let action = RecordingAction {
                identifier: descriptor.identifier().to_string(),
                log: Arc::clone(&log),
            };
            registry
                .register(descriptor.clone(), Arc::new(action))
                .expect("Failed to register action");
        }

        let retriever = Arc::new(Retriever::new(embedder));
        let mut dispatcher = Dispatcher::new(Arc::clone(&retriever), Arc::new(registry));
        if let Some(codegen) = codegen {
            dispatcher = dispatcher.with_code_generator(codegen);
        }

        Self {
            catalog,
            retriever,
            dispatcher: Arc::new(dispatcher),
            log,
        }
    }

    /// Initialize the dispatcher's index.
    pub async fn initialized(self) -> Self {
        self.dispatcher
            .initialize()
            .await
            .expect("Failed to initialize dispatcher");
        self
    }

    /// Identifiers of every action run so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
