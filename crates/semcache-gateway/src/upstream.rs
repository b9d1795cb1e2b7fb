//! `UpstreamClient` (spec.md §4.5).

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use thiserror::Error;

/// Byte stream returned by [`UpstreamClient::complete_stream`]. Matches the
/// `Result<Bytes, UpstreamError>` shape `semcache::streaming::tee` expects.
pub type ByteStream = std::pin::Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send>>;

/// `UPSTREAM_4XX` / `UPSTREAM_5XX` / transport per spec §4.5, §7. No retry.
#[derive(Debug, Error, Clone)]
pub enum UpstreamError {
    /// Forwarded as-is to the client.
    #[error("upstream returned client error {status}")]
    ClientError { status: axum::http::StatusCode, body: Bytes },

    /// Surfaced as 502.
    #[error("upstream returned server error {0}")]
    ServerError(axum::http::StatusCode),

    /// Surfaced as 502.
    #[error("upstream transport error: {0}")]
    Transport(String),
}

/// A non-streaming completion: status plus the raw response body, kept
/// verbatim so a MISS response can be relayed byte-for-byte (§4.8:
/// "Non-streaming MISS: emit the upstream body verbatim").
pub struct RawCompletion {
    pub status: axum::http::StatusCode,
    pub body: Bytes,
}

pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    /// `SEMCACHE_MOCK_UPSTREAM` (SPEC_FULL.md §D): skip the network call and
    /// return a canned completion, mirroring the teacher's `mock_provider`
    /// flag. Never set in a real deployment.
    mock: bool,
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            mock: false,
        }
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    fn mock_content(request: &serde_json::Value) -> String {
        let prompt = request
            .get("messages")
            .and_then(|m| m.as_array())
            .and_then(|messages| messages.last())
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .unwrap_or("");
        format!("Mock response for: {prompt}")
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut builder = self.client.post(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }

    /// §4.5 `Complete(request) → Completion` (non-streaming).
    pub async fn complete(&self, request: &serde_json::Value) -> Result<RawCompletion, UpstreamError> {
        if self.mock {
            let body = serde_json::json!({
                "id": format!("chatcmpl-{}", uuid::Uuid::new_v4()),
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": Self::mock_content(request) },
                    "finish_reason": "stop",
                }],
            });
            return Ok(RawCompletion {
                status: axum::http::StatusCode::OK,
                body: bytes::Bytes::from(body.to_string()),
            });
        }

        let response = self
            .request("/chat/completions")
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if status.is_client_error() {
            return Err(UpstreamError::ClientError { status, body });
        }
        if !status.is_success() {
            return Err(UpstreamError::ServerError(status));
        }

        Ok(RawCompletion { status, body })
    }

    /// §4.5 `CompleteStream(request) → ByteStream` (streaming). The caller
    /// is responsible for consuming to completion or cancelling (§4.5).
    pub async fn complete_stream(&self, request: &serde_json::Value) -> Result<ByteStream, UpstreamError> {
        if self.mock {
            let content = Self::mock_content(request);
            let chunk = serde_json::json!({
                "id": format!("chatcmpl-{}", uuid::Uuid::new_v4()),
                "object": "chat.completion.chunk",
                "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }],
            });
            let frame = format!("data: {chunk}\n\ndata: [DONE]\n\n");
            let items: Vec<Result<Bytes, UpstreamError>> = vec![Ok(Bytes::from(frame))];
            return Ok(Box::pin(futures_util::stream::iter(items)));
        }

        let response = self
            .request("/chat/completions")
            .json(request)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response
                .bytes()
                .await
                .map_err(|e| UpstreamError::Transport(e.to_string()))?;
            return Err(UpstreamError::ClientError { status, body });
        }
        if !status.is_success() {
            return Err(UpstreamError::ServerError(status));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| UpstreamError::Transport(e.to_string()));

        Ok(Box::pin(stream))
    }
}
