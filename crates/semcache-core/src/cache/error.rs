use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::vectordb::VectorIndexError;

/// Errors a `CacheDecision` can fail the foreground request with.
/// `StorageError` on `Get` is deliberately absent: per spec §7 it's
/// swallowed and treated as a miss, never surfaced here.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Embed(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] VectorIndexError),
}
