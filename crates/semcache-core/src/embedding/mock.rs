//! Error-injecting `Embedder` test double (gated behind the `mock` feature).

use super::{Embedder, EmbeddingError};

/// Always fails with the given error; used to exercise `EMBED_UNAVAILABLE`.
pub struct FailingEmbedder {
    error: EmbeddingError,
    dim: usize,
}

impl FailingEmbedder {
    pub fn new(error: EmbeddingError, dim: usize) -> Self {
        Self { error, dim }
    }
}

impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(self.error.clone())
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
