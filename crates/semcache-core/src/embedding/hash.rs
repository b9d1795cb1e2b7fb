use super::error::EmbeddingError;
use super::Embedder;

/// A deterministic, network-free `Embedder`.
///
/// Spec.md §1 excludes "training or hosting the embedding model" as a
/// non-goal, so a real deployment points `AnyEmbedder` at an external
/// embeddings API ([`super::http::HttpEmbedder`]). This one exists for the
/// case a deployment has no such API yet, and for tests that need an
/// `Embedder` whose output is a pure function of its input: it stretches a
/// BLAKE3 hash of the text into `dim` floats, so two calls with the same
/// text always return bit-identical vectors (§3: "Pure function modulo the
/// model identifier").
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(hash_embed(text, self.dim))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

/// Expands a keyed BLAKE3 hash into `dim` floats in `[-1, 1]` via an XOF,
/// then L2-normalizes so cosine similarity behaves like it would for a real
/// embedding model.
pub fn hash_embed(text: &str, dim: usize) -> Vec<f32> {
    let mut xof = blake3::Hasher::new().update(text.as_bytes()).finalize_xof();
    let mut raw = vec![0u8; dim * 4];
    xof.fill(&mut raw);

    let mut values: Vec<f32> = raw
        .chunks_exact(4)
        .map(|chunk| {
            let bits = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            // map to [-1, 1]
            (bits as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect();

    let norm: f32 = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut values {
            *v /= norm;
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let embedder = HashEmbedder::new(16);
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn different_text_embeds_differently() {
        let embedder = HashEmbedder::new(16);
        let a = embedder.embed("hello world").await.unwrap();
        let b = embedder.embed("goodbye world").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn output_has_requested_dimension() {
        let embedder = HashEmbedder::new(32);
        let v = embedder.embed("x").await.unwrap();
        assert_eq!(v.len(), 32);
        assert_eq!(embedder.dimension(), 32);
    }

    #[tokio::test]
    async fn output_is_unit_normalized() {
        let embedder = HashEmbedder::new(16);
        let v = embedder.embed("normalize me").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
