use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use tracing::{debug, info, instrument, Instrument};

use semcache::{flatten_prompt, hashing::hash_prompt, AdmissionPlan, ContentStore, DecisionOutcome, Embedder, Message, Role, VectorIndex};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::responder;

/// §6: "Recognized option `noCache: bool` (default false)."
const NO_CACHE_FIELD: &str = "noCache";

#[instrument(skip(state, _headers, request), fields(model = tracing::field::Empty, prompt_hash = tracing::field::Empty))]
pub async fn chat_completions_handler<E, V, C>(
    State(state): State<HandlerState<E, V, C>>,
    _headers: HeaderMap,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    // §6: end-client Authorization headers are not propagated upstream;
    // server-side credentials (`UpstreamClient`) carry auth instead.
    let messages = parse_messages(&request)?;
    let model = request
        .get("model")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let stream = request.get("stream").and_then(|v| v.as_bool()).unwrap_or(false);
    let no_cache = request
        .get(NO_CACHE_FIELD)
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if let Some(m) = &model {
        tracing::Span::current().record("model", tracing::field::display(m));
    }

    let prompt = flatten_prompt(&messages);
    tracing::Span::current().record("prompt_hash", tracing::field::display(hash_prompt(&prompt)));
    let outcome = state.decision.decide(&prompt, no_cache).await?;

    match outcome {
        DecisionOutcome::Hit { content } => {
            info!("cache hit");
            if stream {
                let id = format!("chatcmpl-{}", uuid::Uuid::new_v4());
                let created = chrono::Utc::now().to_rfc3339();
                let model = model.unwrap_or_else(|| state.config.default_model.clone());
                Ok(responder::hit_stream(&id, &created, &model, &content))
            } else {
                Ok(responder::hit_json(&content))
            }
        }
        DecisionOutcome::Miss { vector } => {
            debug!("cache miss");
            handle_miss(state, request, stream, AdmissionPlan::NewEntry { vector }, "miss").await
        }
        DecisionOutcome::OrphanRepair { vector: _, orphan_id } => {
            debug!(id = %orphan_id, "orphan vector; repairing on this miss");
            handle_miss(
                state,
                request,
                stream,
                AdmissionPlan::OrphanRepair { id: orphan_id },
                "orphan-repair",
            )
            .await
        }
    }
}

async fn handle_miss<E, V, C>(
    state: HandlerState<E, V, C>,
    request: serde_json::Value,
    stream: bool,
    plan: AdmissionPlan,
    status_tag: &'static str,
) -> Result<Response, GatewayError>
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    let forward_request = strip_no_cache(request);

    if stream {
        let upstream_stream = state.upstream.complete_stream(&forward_request).await?;
        let (live, capture) = semcache::tee(upstream_stream, state.config.capture_max_bytes);

        let writer = state.writer.clone();
        let span = tracing::Span::current();
        state.tracker.spawn(
            async move {
                writer.commit(capture, plan).await;
            }
            .instrument(span),
        );

        Ok(responder::miss_stream_relay(live, status_tag))
    } else {
        let completion = state.upstream.complete(&forward_request).await?;

        if let Some(text) = extract_message_content(&completion.body) {
            let writer = state.writer.clone();
            let span = tracing::Span::current();
            state.tracker.spawn(
                async move {
                    writer.commit_text(plan, &text).await;
                }
                .instrument(span),
            );
        } else {
            debug!("could not extract message content from upstream body; not admitting");
        }

        Ok(responder::miss_json_passthrough(completion, status_tag))
    }
}

fn parse_messages(request: &serde_json::Value) -> Result<Vec<Message>, GatewayError> {
    let raw_messages = request
        .get("messages")
        .and_then(|v| v.as_array())
        .ok_or_else(|| GatewayError::InvalidRequest("missing or invalid `messages`".to_string()))?;

    raw_messages
        .iter()
        .map(|m| {
            let role_str = m
                .get("role")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GatewayError::InvalidRequest("message missing `role`".to_string()))?;
            let role: Role = role_str
                .parse()
                .map_err(|_| GatewayError::InvalidRequest(format!("unsupported role `{role_str}`")))?;
            let content = m
                .get("content")
                .and_then(|v| v.as_str())
                .ok_or_else(|| GatewayError::InvalidRequest("message missing string `content`".to_string()))?;
            Ok(Message::new(role, content))
        })
        .collect()
}

/// §6: "Upstream... with the unmodified request (after stripping `noCache`)."
fn strip_no_cache(mut request: serde_json::Value) -> serde_json::Value {
    if let Some(obj) = request.as_object_mut() {
        obj.remove(NO_CACHE_FIELD);
    }
    request
}

fn extract_message_content(body: &bytes::Bytes) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_no_cache_removes_only_that_field() {
        let request = serde_json::json!({"model": "gpt-4o-mini", "noCache": true, "messages": []});
        let stripped = strip_no_cache(request);
        assert!(stripped.get("noCache").is_none());
        assert_eq!(stripped.get("model").unwrap(), "gpt-4o-mini");
    }

    #[test]
    fn parse_messages_rejects_missing_content() {
        let request = serde_json::json!({"messages": [{"role": "user"}]});
        assert!(parse_messages(&request).is_err());
    }

    #[test]
    fn parse_messages_accepts_well_formed_sequence() {
        let request = serde_json::json!({
            "messages": [
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "hi"},
            ]
        });
        let messages = parse_messages(&request).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn extract_message_content_reads_first_choice() {
        let body = bytes::Bytes::from_static(
            br#"{"choices":[{"message":{"content":"hello"}}]}"#,
        );
        assert_eq!(extract_message_content(&body), Some("hello".to_string()));
    }

    #[test]
    fn extract_message_content_is_none_on_malformed_body() {
        let body = bytes::Bytes::from_static(b"not json");
        assert_eq!(extract_message_content(&body), None);
    }
}
