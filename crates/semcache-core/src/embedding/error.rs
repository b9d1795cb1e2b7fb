use thiserror::Error;

/// `EMBED_UNAVAILABLE` per spec §4.2 / §7: the core propagates this as a
/// 502-class error rather than serving stale cache.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("embedding backend unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("embedding backend returned an invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },
}
