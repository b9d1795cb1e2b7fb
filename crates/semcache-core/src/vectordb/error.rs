use thiserror::Error;

/// `INDEX_UNAVAILABLE` per spec §7: fail the request 502, no bypass in core.
#[derive(Debug, Clone, Error)]
pub enum VectorIndexError {
    #[error("failed to connect to vector index at '{url}': {message}")]
    ConnectionFailed { url: String, message: String },

    #[error("failed to create collection '{collection}': {message}")]
    CreateCollectionFailed { collection: String, message: String },

    #[error("failed to insert points into '{collection}': {message}")]
    InsertFailed { collection: String, message: String },

    #[error("failed to query '{collection}': {message}")]
    QueryFailed { collection: String, message: String },

    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },
}
