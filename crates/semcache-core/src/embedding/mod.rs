//! `Embedder`: turns a flattened prompt into a fixed-width real vector.
//!
//! Spec.md §4.2: a pure function modulo the model identifier, failing with
//! `EMBED_UNAVAILABLE` on transport errors.

mod error;
pub mod hash;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;

pub use error::EmbeddingError;
pub use hash::HashEmbedder;
pub use http::HttpEmbedder;
#[cfg(feature = "mock")]
pub use mock::FailingEmbedder;

/// Contract the rest of the core consumes. Non-dyn (RPITIT), matching
/// [`crate::vectordb::VectorIndex`]; callers select a concrete backend via
/// [`AnyEmbedder`].
pub trait Embedder: Send + Sync {
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// The fixed dimension `D` this embedder produces.
    fn dimension(&self) -> usize;
}

/// Runtime choice of backend, selected once at startup from configuration.
pub enum AnyEmbedder {
    Http(HttpEmbedder),
    Hash(HashEmbedder),
}

impl Embedder for AnyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            Self::Http(e) => e.embed(text).await,
            Self::Hash(e) => e.embed(text).await,
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Self::Http(e) => e.dimension(),
            Self::Hash(e) => e.dimension(),
        }
    }
}
