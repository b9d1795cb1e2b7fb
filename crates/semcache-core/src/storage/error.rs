use thiserror::Error;

/// `STORE_UNAVAILABLE` per spec §7. Disposition differs by call site: on
/// `Get` it's treated as a miss; on `Put` the background write is discarded
/// without failing the foreground response.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("content store unavailable: {reason}")]
    Unavailable { reason: String },
}
