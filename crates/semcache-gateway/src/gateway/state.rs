use std::sync::Arc;

use semcache::{BackgroundWriter, CacheDecision, ContentStore, Embedder, VectorIndex};
use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::upstream::UpstreamClient;

/// Everything a request handler needs: the cache decision/write path plus
/// the upstream client, process config, and the background-task tracker
/// shutdown drains (SPEC_FULL.md §F).
pub struct HandlerState<E, V, C> {
    pub decision: Arc<CacheDecision<E, V, C>>,
    pub writer: Arc<BackgroundWriter<V, C>>,
    /// Kept alongside `decision` (which owns clones of the same `Arc`s) so
    /// `/ready` can probe each collaborator directly without reaching into
    /// `CacheDecision`'s private fields.
    pub(crate) embedder: Arc<E>,
    pub(crate) index: Arc<V>,
    pub(crate) store: Arc<C>,
    pub upstream: Arc<UpstreamClient>,
    pub config: Arc<Config>,
    pub tracker: TaskTracker,
}

impl<E, V, C> Clone for HandlerState<E, V, C> {
    fn clone(&self) -> Self {
        Self {
            decision: self.decision.clone(),
            writer: self.writer.clone(),
            embedder: self.embedder.clone(),
            index: self.index.clone(),
            store: self.store.clone(),
            upstream: self.upstream.clone(),
            config: self.config.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<E, V, C> HandlerState<E, V, C>
where
    E: Embedder + 'static,
    V: VectorIndex + 'static,
    C: ContentStore + 'static,
{
    pub fn new(embedder: Arc<E>, index: Arc<V>, store: Arc<C>, upstream: UpstreamClient, config: Config) -> Self {
        let decision = Arc::new(CacheDecision::new(
            embedder.clone(),
            index.clone(),
            store.clone(),
            config.match_threshold,
        ));
        let writer = Arc::new(BackgroundWriter::new(index.clone(), store.clone(), config.background_deadline));

        Self {
            decision,
            writer,
            embedder,
            index,
            store,
            upstream: Arc::new(upstream),
            config: Arc::new(config),
            tracker: TaskTracker::new(),
        }
    }

    /// Exposed so callers outside this crate (gateway integration tests)
    /// can seed or inspect a collaborator directly, the way the teacher's
    /// test harness reaches into `TieredCache`/`MockBqClient`.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn store(&self) -> &C {
        &self.store
    }
}
