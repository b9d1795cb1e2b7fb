//! `ContentStore`: durable mapping from opaque id to completion text.
//!
//! Spec.md §4.4 / §6: `Get(id) -> text | none`, `Put(id, text)`. Eventual
//! consistency is acceptable; `Put` is assumed durable before its
//! acknowledgment returns.

pub mod error;
pub mod memory;
#[cfg(feature = "mock")]
pub mod mock;

pub use error::StorageError;
pub use memory::InMemoryContentStore;
#[cfg(feature = "mock")]
pub use mock::FailingContentStore;

/// Contract collaborators implement. Non-dyn, mirroring
/// [`crate::vectordb::VectorIndex`] and [`crate::embedding::Embedder`].
pub trait ContentStore: Send + Sync {
    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    fn put(
        &self,
        id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Runtime choice of backend, selected once at startup from configuration.
pub enum AnyContentStore {
    Memory(InMemoryContentStore),
}

impl ContentStore for AnyContentStore {
    async fn get(&self, id: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Memory(s) => s.get(id).await,
        }
    }

    async fn put(&self, id: &str, text: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(s) => s.put(id, text).await,
        }
    }
}
