//! Two-stage search: an approximate Hamming-distance filter over binary
//! codes, then an exact cosine rerank of the surviving candidates.

use std::cmp::Reverse;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::collection::Collection;
use crate::error::{QuiverError, Result};
use crate::models::SearchHit;
use crate::storage::VectorStore;
use crate::vector::{dot, from_blob, normalize, to_bits};

/// Orchestrates the two-stage search against a storage backend.
pub struct Searcher {
    store: Arc<dyn VectorStore>,
}

impl Searcher {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Find the `top_n` most similar records to `query`.
    ///
    /// Stage 1 asks the backend for the `top_n` records with the smallest
    /// Hamming distance between binary codes, a deliberately lossy prune
    /// whose recall is bounded by `top_n`. Stage 2 recomputes exact cosine
    /// similarity for each survivor and sorts descending. An empty
    /// collection yields an empty result; `top_n` at or above the
    /// collection size degrades to an exact full ranking.
    pub fn search(
        &self,
        collection: &Collection,
        query: &[f32],
        top_n: usize,
    ) -> Result<Vec<SearchHit>> {
        if query.is_empty() {
            return Err(QuiverError::InvalidArgument(
                "query vector is empty".to_string(),
            ));
        }
        if top_n == 0 {
            return Err(QuiverError::InvalidArgument(
                "top_n must be positive".to_string(),
            ));
        }
        if query.len() != collection.dimension {
            return Err(QuiverError::InvalidDimension {
                expected: collection.dimension,
                actual: query.len(),
            });
        }

        // Stage 1: approximate filter on quantized sign bits
        let normalized = normalize(query);
        let code = to_bits(&normalized);
        let candidates = self
            .store
            .top_k_by_hamming(&collection.name, &code, top_n)?;
        let candidate_count = candidates.len();

        // Stage 2: exact rerank over the candidate set
        let mut hits = candidates
            .into_iter()
            .map(|record| {
                let vector = from_blob(&record.blob)?;
                Ok(SearchHit::new(record.id, dot(&vector, &normalized)))
            })
            .collect::<Result<Vec<_>>>()?;
        hits.sort_by_key(|hit| Reverse(OrderedFloat(hit.similarity)));
        hits.truncate(top_n);

        debug!(
            collection = %collection.name,
            top_n,
            candidates = candidate_count,
            results = hits.len(),
            "two-stage search completed"
        );
        Ok(hits)
    }
}
