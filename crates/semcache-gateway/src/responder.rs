//! `Responder` (spec.md §4.8): emits a provider-shaped response regardless of
//! whether the answer came from the cache or upstream.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::Stream;
use serde_json::json;

use crate::gateway::error::SEMCACHE_STATUS_HEADER;
use crate::upstream::{RawCompletion, UpstreamError};

const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";
const DONE_FRAME: &str = "data: [DONE]\n\n";

fn status_headers(tag: &'static str, content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(SEMCACHE_STATUS_HEADER, HeaderValue::from_static(tag));
    headers
}

fn stream_headers(tag: &'static str) -> HeaderMap {
    let mut headers = status_headers(tag, EVENT_STREAM_CONTENT_TYPE);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::TRANSFER_ENCODING,
        HeaderValue::from_static("chunked"),
    );
    headers
}

/// Splits `text` the way §4.8 specifies: contiguous non-whitespace followed
/// by the whitespace run that trails it (regex `\S+\s*`). A leading
/// whitespace-only run before the first token is dropped, matching what a
/// `findall` over that pattern would skip.
pub fn tokenize_sse(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

fn chunk_frame(id: &str, created: &str, model: &str, content: &str, finish_reason: Option<&str>) -> String {
    let payload = json!({
        "id": id,
        "object": "chat.completion.chunk",
        "created": created,
        "model": model,
        "choices": [{
            "index": 0,
            "delta": { "content": content },
            "finish_reason": finish_reason,
        }],
    });
    format!("data: {payload}\n\n")
}

/// Non-streaming HIT (§4.8): `{choices:[{message:{content}}]}`, 200.
pub fn hit_json(content: &str) -> Response {
    let body = json!({
        "choices": [{ "message": { "content": content } }],
    });
    (
        StatusCode::OK,
        status_headers("hit", "application/json"),
        body.to_string(),
    )
        .into_response()
}

/// Non-streaming MISS (§4.8): the upstream body verbatim, byte-for-byte, so
/// already-escaped content is never re-escaped (§4.8, §9).
pub fn miss_json_passthrough(completion: RawCompletion, status_tag: &'static str) -> Response {
    (
        completion.status,
        status_headers(status_tag, "application/json"),
        completion.body,
    )
        .into_response()
}

/// Streaming HIT synthesis (§4.8, §8 scenario 2): one chunk per token from
/// [`tokenize_sse`], `finish_reason: null` throughout, terminated by
/// `[DONE]`. No upstream call is involved.
pub fn hit_stream(id: &str, created: &str, model: &str, content: &str) -> Response {
    let mut body = String::new();
    for token in tokenize_sse(content) {
        body.push_str(&chunk_frame(id, created, model, &token, None));
    }
    body.push_str(DONE_FRAME);

    (StatusCode::OK, stream_headers("hit"), body).into_response()
}

/// Streaming MISS/orphan-repair relay (§4.8, §8 invariant 1): the client
/// gets the tee's Live byte stream verbatim, frame-for-frame as upstream
/// sent it, with no re-parsing on this path.
pub fn miss_stream_relay<S>(live: S, status_tag: &'static str) -> Response
where
    S: Stream<Item = Result<Bytes, UpstreamError>> + Send + 'static,
{
    let body = Body::from_stream(live);
    (StatusCode::OK, stream_headers(status_tag), body).into_response()
}
