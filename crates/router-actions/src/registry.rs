//! Identifier → action map.

use std::collections::HashMap;
use std::sync::Arc;

use router_types::{ActionCatalog, ActionDescriptor};
use tracing::{debug, info};

use crate::action::{Action, ActionError, ActionOutput};

/// Typed registry of invocable actions.
///
/// Populated once at startup. Lookups of identifiers that were never
/// registered fail with [`ActionError::UnknownAction`].
#[derive(Default)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `descriptor.identifier()`.
    pub fn register(
        &mut self,
        descriptor: ActionDescriptor,
        action: Arc<dyn Action>,
    ) -> Result<(), ActionError> {
        let id = descriptor.identifier().to_string();
        if self.contains(&id) {
            return Err(ActionError::Duplicate(id));
        }
        debug!(action = %id, "Registered action");
        self.actions.insert(id, action);
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(
        mut self,
        identifier: &str,
        description: &str,
        action: impl Action + 'static,
    ) -> Result<Self, ActionError> {
        let descriptor = ActionDescriptor::new(identifier, description)?;
        self.register(descriptor, Arc::new(action))?;
        Ok(self)
    }

    /// Descriptors in registration order.
    pub fn catalog(&self) -> ActionCatalog {
        // Identifiers were checked for uniqueness on register.
        ActionCatalog::new(self.descriptors.clone()).unwrap_or_default()
    }

    pub fn get(&self, identifier: &str) -> Result<Arc<dyn Action>, ActionError> {
        self.actions
            .get(identifier)
            .cloned()
            .ok_or_else(|| ActionError::UnknownAction(identifier.to_string()))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.actions.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Look up and run an action.
    pub async fn dispatch(&self, identifier: &str) -> Result<ActionOutput, ActionError> {
        let action = self.get(identifier)?;
        info!(action = identifier, "Executing action");
        action.execute().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo(&'static str);

    #[async_trait]
    impl Action for Echo {
        async fn execute(&self) -> Result<ActionOutput, ActionError> {
            Ok(ActionOutput::text(self.0))
        }
    }

    fn registry() -> ActionRegistry {
        ActionRegistry::new()
            .with("first", "The first action.", Echo("one"))
            .unwrap()
            .with("second", "The second action.", Echo("two"))
            .unwrap()
    }

    #[test]
    fn test_catalog_in_registration_order() {
        let registry = registry();
        let catalog = registry.catalog();
        let ids: Vec<&str> = catalog.iter().map(|d| d.identifier()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("second"));
        assert!(!registry.contains("third"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = registry();
        let descriptor = ActionDescriptor::new("first", "Again.").unwrap();
        let result = registry.register(descriptor, Arc::new(Echo("x")));
        assert!(matches!(result, Err(ActionError::Duplicate(id)) if id == "first"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.catalog().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_known() {
        let output = registry().dispatch("second").await.unwrap();
        assert_eq!(output, ActionOutput::text("two"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown() {
        let result = registry().dispatch("missing").await;
        assert!(matches!(result, Err(ActionError::UnknownAction(id)) if id == "missing"));
    }
}
