//! HTTP gateway layer: routes, health/readiness probes, error mapping.

pub mod error;
pub mod handler;
pub mod state;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

pub use error::{GatewayError, SEMCACHE_STATUS_HEADER};
pub use handler::chat_completions_handler;
pub use state::HandlerState;

use semcache::{ContentStore, Embedder, VectorIndex};

/// Builds the router (SPEC_FULL.md §A, §F): `/chat/completions` is the
/// only endpoint spec.md's core specifies; `/healthz` and `/ready` are the
/// supplementary surface.
pub fn create_router<E, V, C>(state: HandlerState<E, V, C>) -> Router
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<E, V, C>))
        .route("/chat/completions", post(chat_completions_handler::<E, V, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub embedding: &'static str,
    pub vectordb: &'static str,
    pub storage: &'static str,
}

/// Liveness: always 200 once the process has a running event loop.
#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(SEMCACHE_STATUS_HEADER, HeaderValue::from_static("healthy"));
    (StatusCode::OK, headers, Json(HealthResponse { status: "ok" })).into_response()
}

const READY_PROBE_TEXT: &str = "semcache readiness probe";
const READY_PROBE_ID: &str = "__semcache_ready_probe__";

/// Readiness: each collaborator answers a trivial probe (SPEC_FULL.md §F).
/// None of these probes write anything a client could ever read back.
#[tracing::instrument(skip(state))]
pub async fn ready_handler<E, V, C>(State(state): State<HandlerState<E, V, C>>) -> Response
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    let embedding_vector = state.decision_embedder_probe().await;
    let embedding_status = if embedding_vector.is_some() { "ready" } else { "pending" };

    let vectordb_status = match &embedding_vector {
        Some(vector) => match state.decision_index_probe(vector).await {
            true => "ready",
            false => "pending",
        },
        None => "pending",
    };

    let storage_status = match state.decision_store_probe().await {
        true => "ready",
        false => "pending",
    };

    let components = ComponentStatus {
        embedding: embedding_status,
        vectordb: vectordb_status,
        storage: storage_status,
    };

    let is_ready = components.embedding == "ready" && components.vectordb == "ready" && components.storage == "ready";
    let status_code = if is_ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        SEMCACHE_STATUS_HEADER,
        HeaderValue::from_str(status_msg).unwrap_or(HeaderValue::from_static("pending")),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}

impl<E, V, C> HandlerState<E, V, C>
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    async fn decision_embedder_probe(&self) -> Option<Vec<f32>> {
        self.embedder().embed(READY_PROBE_TEXT).await.ok()
    }

    async fn decision_index_probe(&self, vector: &[f32]) -> bool {
        self.index().query(vector, 1).await.is_ok()
    }

    async fn decision_store_probe(&self) -> bool {
        self.store().get(READY_PROBE_ID).await.is_ok()
    }
}
