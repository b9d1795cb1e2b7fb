use serde::Deserialize;

use super::error::EmbeddingError;
use super::Embedder;

/// Calls an OpenAI-compatible `POST {base_url}/embeddings` endpoint.
///
/// Spec.md §1 scopes "training or hosting the embedding model" out; this is
/// the production realization of [`Embedder`] for a deployment that already
/// has an embeddings API to call, mirroring how `UpstreamClient` calls out
/// to a chat-completion API rather than hosting one.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dim: usize,
}

impl HttpEmbedder {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        dim: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            dim,
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url.trim_end_matches('/')))
            .json(&serde_json::json!({ "input": text, "model": self.model }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(EmbeddingError::Unavailable {
                reason: format!("embeddings endpoint returned {}", response.status()),
            });
        }

        let body: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        let vector = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                reason: "empty embeddings response".to_string(),
            })?
            .embedding;

        crate::constants::validate_embedding_dim(vector.len(), self.dim).map_err(|e| {
            EmbeddingError::InvalidResponse {
                reason: e.to_string(),
            }
        })?;

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
