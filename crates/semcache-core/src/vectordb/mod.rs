//! `VectorIndex`: approximate nearest-neighbor over embeddings with score.
//!
//! Spec.md §4.3 / §6: two operations, `query` and `insert`; dimension and
//! score metric are deployment-fixed. This module defines the trait plus
//! two realizations — [`QdrantVectorIndex`] for real deployments and
//! [`memory::InMemoryVectorIndex`] for tests and no-external-dependency runs.

pub mod error;
pub mod memory;
#[cfg(feature = "mock")]
pub mod mock;
pub mod model;
pub mod qdrant;

pub use error::VectorIndexError;
pub use memory::InMemoryVectorIndex;
#[cfg(feature = "mock")]
pub use mock::FailingVectorIndex;
pub use model::{QueryResult, SearchMatch, VectorPoint};
pub use qdrant::QdrantVectorIndex;

/// Contract collaborators implement. Uses return-position `impl Future`
/// rather than `#[async_trait]` so implementors pay no allocation cost per
/// call; the trait stays non-dyn, so callers pick a concrete backend at
/// construction time (see [`AnyVectorIndex`]).
pub trait VectorIndex: Send + Sync {
    /// Top-`k` neighbors, ordered by descending score.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> impl std::future::Future<Output = Result<QueryResult, VectorIndexError>> + Send;

    /// At-least-once, idempotent on id.
    fn insert(
        &self,
        points: Vec<VectorPoint>,
    ) -> impl std::future::Future<Output = Result<(), VectorIndexError>> + Send;
}

/// Runtime choice of backend, selected once at startup from configuration.
pub enum AnyVectorIndex {
    Qdrant(QdrantVectorIndex),
    Memory(InMemoryVectorIndex),
}

impl VectorIndex for AnyVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult, VectorIndexError> {
        match self {
            Self::Qdrant(q) => q.query(vector, top_k).await,
            Self::Memory(m) => m.query(vector, top_k).await,
        }
    }

    async fn insert(&self, points: Vec<VectorPoint>) -> Result<(), VectorIndexError> {
        match self {
            Self::Qdrant(q) => q.insert(points).await,
            Self::Memory(m) => m.insert(points).await,
        }
    }
}
