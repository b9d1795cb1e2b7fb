//! Cross-cutting, shared constants.
//!
//! These are the deployment-fixed values spec.md §6 calls out. Per-process
//! overrides live in `semcache-gateway::config::Config`; the constants here
//! are the fallback defaults and the values tests build fixtures against.

/// Default vector dimension. Embedder and VectorIndex must agree on this.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// §4.1 `MATCH_THRESHOLD` reference value.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.9;

/// §4.6 Capture buffer cap, in bytes.
pub const DEFAULT_CAPTURE_MAX_BYTES: usize = 1024 * 1024;

/// §5 background deadline, in milliseconds.
pub const DEFAULT_BACKGROUND_DEADLINE_MS: u64 = 120_000;

/// §6 `DEFAULT_MODEL`, used when synthesizing streaming HIT chunks for a
/// request that omitted `model`.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Minimum entropy, in bytes, required of a freshly minted cache entry id
/// (§3: "≥120 bits of entropy"). A v4 UUID carries 122 bits, which clears
/// this with room to spare.
pub const MIN_ID_ENTROPY_BYTES: usize = 15;

/// Error returned when an embedding's runtime dimension doesn't match the
/// dimension a collaborator (VectorIndex, ContentStore) was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "embedding dimension mismatch: expected {}, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Validates that a runtime embedding dimension matches the dimension a
/// collaborator was configured with. Call this at module boundaries (after
/// `Embedder::embed`, before `VectorIndex::insert`) so a misconfigured
/// deployment fails loudly instead of corrupting the index.
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimensionMismatch> {
    if actual != expected {
        return Err(DimensionMismatch { expected, actual });
    }
    Ok(())
}
