use serde::{Deserialize, Serialize};

use super::record::VectorId;

/// Search result with exact cosine similarity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: VectorId,
    /// Cosine similarity against the query, in [-1, 1]
    pub similarity: f32,
}

impl SearchHit {
    pub fn new(id: VectorId, similarity: f32) -> Self {
        Self { id, similarity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_hit() {
        let hit = SearchHit::new(42, 0.95);
        assert_eq!(hit.id, 42);
        assert_eq!(hit.similarity, 0.95);
    }
}
