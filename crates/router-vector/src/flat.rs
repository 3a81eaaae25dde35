//! Exact brute-force index.
//!
//! Every search computes the squared L2 distance from the query to each
//! stored vector and keeps the k smallest. Sorting is stable, so equal
//! distances keep catalog order.

use router_embeddings::Embedding;
use tracing::{debug, info};

use crate::error::VectorError;
use crate::index::{IndexEntry, SearchResult, VectorIndex};

/// Squared Euclidean distance. Callers guarantee equal lengths.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn is_zero(values: &[f32]) -> bool {
    values.iter().all(|v| *v == 0.0)
}

/// Linear-scan index over a small catalog.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
    dimension: Option<usize>,
}

impl FlatIndex {
    /// Create an empty, unbuilt index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and build in one step.
    pub fn from_entries(entries: Vec<IndexEntry>) -> Result<Self, VectorError> {
        let mut index = Self::new();
        index.build(entries)?;
        Ok(index)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Check entries before they replace the current contents.
    fn validate(entries: &[IndexEntry]) -> Result<usize, VectorError> {
        let first = entries.first().ok_or(VectorError::EmptyIndex)?;
        let expected = first.dimension();
        if expected == 0 {
            return Err(VectorError::EmptyVector);
        }

        for (position, entry) in entries.iter().enumerate() {
            if entry.dimension() != expected {
                return Err(VectorError::DimensionMismatch {
                    expected,
                    actual: entry.dimension(),
                });
            }
            if entry.vector.values.iter().any(|v| !v.is_finite()) {
                return Err(VectorError::NonFiniteValue(position));
            }
            if is_zero(entry.vector.as_slice()) {
                return Err(VectorError::ZeroVector(position));
            }
        }
        Ok(expected)
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn build(&mut self, entries: Vec<IndexEntry>) -> Result<(), VectorError> {
        let dimension = Self::validate(&entries)?;

        self.entries = entries;
        self.dimension = Some(dimension);

        info!(
            entries = self.entries.len(),
            dim = dimension,
            "Built flat vector index"
        );
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<SearchResult>, VectorError> {
        let dimension = self.dimension.ok_or(VectorError::NotBuilt)?;
        if k == 0 {
            return Err(VectorError::InvalidK(k));
        }
        if query.dimension() != dimension {
            return Err(VectorError::DimensionMismatch {
                expected: dimension,
                actual: query.dimension(),
            });
        }
        if is_zero(query.as_slice()) {
            return Err(VectorError::ZeroQuery);
        }

        let k = k.min(self.entries.len());

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, squared_l2(query.as_slice(), entry.vector.as_slice())))
            .collect();

        // Stable sort keeps insertion order among equal distances.
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(k);

        let results: Vec<SearchResult> = scored
            .into_iter()
            .map(|(i, distance)| SearchResult::new(self.entries[i].descriptor.clone(), distance))
            .collect();

        debug!(k = k, found = results.len(), "Search complete");
        Ok(results)
    }
}
