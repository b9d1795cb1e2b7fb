use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use semcache::{CacheError, EmbeddingError, VectorIndexError};

use crate::upstream::UpstreamError;

pub const SEMCACHE_STATUS_HEADER: &str = "x-semcache-status";

/// Maps the spec.md §7 error-kind table onto HTTP responses. Most error
/// kinds in that table (`STORE_UNAVAILABLE`, `PARSE_FAILED`,
/// `CAPTURE_OVERFLOW`) never reach here: they're handled inside the core
/// without failing the foreground response. Only the kinds that fail the
/// request in core surface as a `GatewayError`.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `EMBED_UNAVAILABLE`: fail 502, do not call upstream.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    /// `INDEX_UNAVAILABLE`: fail 502.
    #[error("vector index unavailable: {0}")]
    IndexUnavailable(#[from] VectorIndexError),

    /// `UPSTREAM_4XX`: forwarded as-is with the upstream status and body.
    #[error("upstream returned client error status {status}")]
    UpstreamClientError {
        status: StatusCode,
        body: bytes::Bytes,
    },

    /// `UPSTREAM_5XX` / transport error: 502 to client.
    #[error("upstream error: {0}")]
    UpstreamFailure(String),
}

impl From<CacheError> for GatewayError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Embed(e) => GatewayError::EmbeddingUnavailable(e),
            CacheError::Index(e) => GatewayError::IndexUnavailable(e),
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::ClientError { status, body } => {
                GatewayError::UpstreamClientError { status, body }
            }
            other => GatewayError::UpstreamFailure(other.to_string()),
        }
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::UpstreamClientError { status, body } = self {
            let mut headers = HeaderMap::new();
            headers.insert(
                SEMCACHE_STATUS_HEADER,
                HeaderValue::from_static("upstream-error"),
            );
            return (status, headers, body).into_response();
        }

        let (status, status_tag) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid-request"),
            GatewayError::EmbeddingUnavailable(_) => (StatusCode::BAD_GATEWAY, "embed-unavailable"),
            GatewayError::IndexUnavailable(_) => (StatusCode::BAD_GATEWAY, "index-unavailable"),
            GatewayError::UpstreamFailure(_) => (StatusCode::BAD_GATEWAY, "upstream-error"),
            GatewayError::UpstreamClientError { .. } => unreachable!("handled above"),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            SEMCACHE_STATUS_HEADER,
            HeaderValue::from_static(status_tag),
        );

        let body = Json(ErrorBody {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
