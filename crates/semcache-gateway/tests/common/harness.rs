//! In-process test harness: builds a router over fully in-memory
//! collaborators and drives it with `tower::ServiceExt::oneshot` (no bound
//! socket), per SPEC_FULL.md §E.

use std::sync::Arc;

use axum::Router;
use semcache::{Embedder, HashEmbedder, InMemoryContentStore, InMemoryVectorIndex};

use semcache_gateway::config::Config;
use semcache_gateway::gateway::{create_router, HandlerState};
use semcache_gateway::upstream::UpstreamClient;

pub type TestState = HandlerState<HashEmbedder, InMemoryVectorIndex, InMemoryContentStore>;

/// A fully in-memory stack: `HashEmbedder` (deterministic, network-free),
/// `InMemoryVectorIndex`, `InMemoryContentStore`, and `UpstreamClient` in
/// mock mode. Mirrors the teacher's `spawn_test_server`, minus the bound
/// TCP listener `tower::ServiceExt::oneshot` makes unnecessary.
pub struct TestHarness {
    pub state: TestState,
    embedder: Arc<HashEmbedder>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let embedder = Arc::new(HashEmbedder::new(config.embedding_dim));
        let index = Arc::new(InMemoryVectorIndex::new());
        let store = Arc::new(InMemoryContentStore::new());
        let upstream = UpstreamClient::new(reqwest::Client::new(), "http://unused.invalid", None)
            .with_mock(config.mock_upstream);

        let state = HandlerState::new(embedder.clone(), index, store, upstream, config);
        Self { state, embedder }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Embeds `text` with the same embedder the harness wired into the
    /// router, so a test can seed the index with a vector the router's
    /// `/chat/completions` path will actually reproduce for that text.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        self.embedder.embed(text).await.unwrap()
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.mock_upstream = true;
    config.match_threshold = 0.9;
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_a_router() {
        let harness = TestHarness::new();
        let _ = harness.router();
    }
}
