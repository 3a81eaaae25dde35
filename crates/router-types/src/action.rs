//! Action descriptors and the catalog they form.
//!
//! A descriptor is the only thing the retrieval core knows about an action:
//! a stable identifier and the human-readable description that gets embedded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Identifier and description of one invocable action.
///
/// Immutable once created; lives for the lifetime of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionDescriptor {
    identifier: String,
    description: String,
}

impl ActionDescriptor {
    /// Create a descriptor, rejecting blank identifiers or descriptions.
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, RouterError> {
        let identifier = identifier.into();
        let description = description.into();

        if identifier.trim().is_empty() {
            return Err(RouterError::InvalidInput(
                "action identifier must not be empty".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(RouterError::InvalidInput(format!(
                "description for action '{}' must not be empty",
                identifier
            )));
        }

        Ok(Self {
            identifier,
            description,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Ordered set of action descriptors with unique identifiers.
///
/// Order is significant: it is the insertion order of the vector index and
/// therefore the tie-break order for equal distances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionCatalog {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionCatalog {
    /// Build a catalog, failing on the first duplicated identifier.
    pub fn new(descriptors: Vec<ActionDescriptor>) -> Result<Self, RouterError> {
        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(descriptor.identifier()) {
                return Err(RouterError::DuplicateAction(
                    descriptor.identifier().to_string(),
                ));
            }
        }
        Ok(Self { descriptors })
    }

    /// Build a catalog from `(identifier, description)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let descriptors = pairs
            .into_iter()
            .map(|(id, desc)| ActionDescriptor::new(id, desc))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(descriptors)
    }

    pub fn descriptors(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, identifier: &str) -> Option<&ActionDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.identifier() == identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.descriptors.iter()
    }
}

impl<'a> IntoIterator for &'a ActionCatalog {
    type Item = &'a ActionDescriptor;
    type IntoIter = std::slice::Iter<'a, ActionDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}
