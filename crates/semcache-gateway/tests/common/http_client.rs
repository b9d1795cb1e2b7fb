//! Request/response helpers for driving a [`Router`] with
//! `tower::ServiceExt::oneshot` instead of a bound socket.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub struct DrainedResponse {
    pub status: StatusCode,
    pub header: Option<String>,
    pub json: serde_json::Value,
    pub text: String,
}

async fn drain(response: Response<Body>) -> DrainedResponse {
    let status = response.status();
    let header = response
        .headers()
        .get("x-semcache-status")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8_lossy(&bytes).to_string();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    DrainedResponse {
        status,
        header,
        json,
        text,
    }
}

pub async fn post_json(router: Router, path: &str, body: serde_json::Value) -> DrainedResponse {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    drain(response).await
}

pub async fn get(router: Router, path: &str) -> DrainedResponse {
    let request = Request::builder().method("GET").uri(path).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    drain(response).await
}

/// Parses a `text/event-stream` body into the ordered list of `data: ...`
/// payloads, dropping the terminal `[DONE]` marker.
pub fn sse_data_frames(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter(|data| *data != "[DONE]")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_data_frames_drops_done_marker() {
        let body = "data: {\"a\":1}\n\ndata: [DONE]\n\n";
        let frames = sse_data_frames(body);
        assert_eq!(frames, vec!["{\"a\":1}".to_string()]);
    }
}
