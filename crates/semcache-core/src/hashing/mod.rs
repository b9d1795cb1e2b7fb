//! Id minting and log-correlation hashing.
//!
//! Spec.md §3: a `CacheEntry` id is "a collision-resistant random token
//! (≥120 bits of entropy)"; §9: "any collision-resistant generator (≥15
//! bytes of entropy, URL-safe) is acceptable. Do not reuse model-provided
//! ids." A v4 UUID clears both bars.

/// Mints a fresh, opaque cache entry id.
#[inline]
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// BLAKE3 digest of a flattened prompt, hex-encoded. Used only for log
/// correlation (so a request and its eventual background write can be
/// traced to the same prompt without logging the prompt text itself); never
/// used as a cache key — that's the embedding's job.
#[inline]
pub fn hash_prompt(prompt: &str) -> String {
    blake3::hash(prompt.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_parse_as_uuids() {
        let id = generate_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn hash_prompt_is_deterministic() {
        assert_eq!(hash_prompt("hello"), hash_prompt("hello"));
    }

    #[test]
    fn hash_prompt_distinguishes_inputs() {
        assert_ne!(hash_prompt("hello"), hash_prompt("Hello"));
    }
}
