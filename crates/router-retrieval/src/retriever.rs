//! Catalog embedding and query resolution.
//!
//! The active index sits behind `RwLock<Option<Arc<FlatIndex>>>`. Readers
//! hold the lock only long enough to clone the `Arc`; `initialize` embeds
//! and builds a complete new index without the lock, then swaps it in. A
//! search therefore sees either the old index or the new one, never a
//! partial build.

use std::sync::{Arc, PoisonError, RwLock};

use router_embeddings::{EmbeddingModel, ModelInfo};
use router_types::ActionDescriptor;
use router_vector::{FlatIndex, IndexEntry, IndexStats, SearchResult, VectorIndex};
use tracing::{debug, info};

use crate::error::RetrievalError;

/// Maps queries to the nearest catalog actions.
///
/// Construct once at startup and share as `Arc<Retriever>`.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingModel>,
    active: RwLock<Option<Arc<FlatIndex>>>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            embedder,
            active: RwLock::new(None),
        }
    }

    /// Embed every description (in catalog order) and publish a new index.
    ///
    /// Calling again performs a full rebuild; in-flight searches finish
    /// against whichever index they started with.
    pub fn initialize(&self, catalog: &[ActionDescriptor]) -> Result<(), RetrievalError> {
        if catalog.is_empty() {
            return Err(RetrievalError::CatalogEmpty);
        }

        let texts: Vec<&str> = catalog.iter().map(|d| d.description()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != catalog.len() {
            return Err(RetrievalError::EmbeddingCountMismatch {
                expected: catalog.len(),
                actual: vectors.len(),
            });
        }

        let entries: Vec<IndexEntry> = catalog
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(descriptor, vector)| IndexEntry::new(descriptor, vector))
            .collect();

        let index = Arc::new(FlatIndex::from_entries(entries)?);
        let dimension = index.dimension().unwrap_or(0);

        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(index);

        info!(
            actions = catalog.len(),
            dim = dimension,
            model = %self.embedder.info().name,
            rebuilt = previous.is_some(),
            "Retriever initialized"
        );
        Ok(())
    }

    /// Embed `query` and return the `top_k` nearest actions, nearest first.
    ///
    /// `top_k` above the catalog size is clamped; `top_k == 0` is an
    /// `InvalidK` index error.
    pub fn resolve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, RetrievalError> {
        let index = self.current()?;
        let embedding = self.embedder.embed(query)?;
        let results = index.search(&embedding, top_k)?;

        debug!(
            top_k,
            best = results.first().map(|r| r.identifier()).unwrap_or(""),
            "Resolved query"
        );
        Ok(results)
    }

    /// Nearest single action.
    pub fn resolve_top(&self, query: &str) -> Result<SearchResult, RetrievalError> {
        self.resolve(query, 1)?
            .into_iter()
            .next()
            .ok_or(RetrievalError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Statistics of the active index (default stats before initialize).
    pub fn stats(&self) -> IndexStats {
        self.current()
            .map(|index| index.stats())
            .unwrap_or_default()
    }

    /// Descriptors of the active index, in insertion order.
    pub fn catalog(&self) -> Vec<ActionDescriptor> {
        self.current()
            .map(|index| index.entries().iter().map(|e| e.descriptor.clone()).collect())
            .unwrap_or_default()
    }

    pub fn embedder_info(&self) -> &ModelInfo {
        self.embedder.info()
    }

    fn current(&self) -> Result<Arc<FlatIndex>, RetrievalError> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(RetrievalError::NotInitialized)
    }
}
