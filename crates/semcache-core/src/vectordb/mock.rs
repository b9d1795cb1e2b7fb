//! Error-injecting `VectorIndex` test double (gated behind the `mock` feature).
//!
//! Grounded on the teacher's `MockBqClient`: a thin wrapper that can be
//! configured to fail, so gateway integration tests can exercise the
//! `INDEX_UNAVAILABLE` disposition (spec.md §7) without a real Qdrant.

use super::error::VectorIndexError;
use super::model::QueryResult;
use super::{VectorIndex, VectorPoint};

/// Always fails both operations with the given error, cloned per call.
pub struct FailingVectorIndex {
    error: VectorIndexError,
}

impl FailingVectorIndex {
    pub fn new(error: VectorIndexError) -> Self {
        Self { error }
    }
}

impl VectorIndex for FailingVectorIndex {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<QueryResult, VectorIndexError> {
        Err(self.error.clone())
    }

    async fn insert(&self, _points: Vec<VectorPoint>) -> Result<(), VectorIndexError> {
        Err(self.error.clone())
    }
}
