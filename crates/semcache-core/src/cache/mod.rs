//! `CacheDecision` (spec.md §4.1): decide miss/hit/force-miss and orchestrate
//! the two resulting flows.

pub mod error;
pub mod writer;

pub use error::CacheError;
pub use writer::{AdmissionPlan, BackgroundWriter};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::embedding::Embedder;
use crate::storage::ContentStore;
use crate::vectordb::VectorIndex;

/// §4.1: "queries index with top-K=1".
const TOP_K: usize = 1;

/// The outcome of `CacheDecision::decide`, carrying everything the HTTP
/// handler needs to either serve a hit or call upstream and commit a miss.
pub enum DecisionOutcome {
    /// `store.Get(top.id)` returned content: serve it directly.
    Hit { content: String },
    /// No sufficiently similar vector, or `noCache: true`. A successful
    /// upstream call should be admitted as a brand-new entry.
    Miss { vector: Vec<f32> },
    /// A vector matched above threshold but its content was missing
    /// (§4.1's orphan case). Treated as a miss for the foreground response;
    /// on a successful upstream call the orphan id should be repaired
    /// in place rather than minting a new id and leaving the vector
    /// dangling a second time.
    OrphanRepair { vector: Vec<f32>, orphan_id: String },
}

/// Orchestrates Embedder + VectorIndex + ContentStore to produce a
/// [`DecisionOutcome`] for one request.
pub struct CacheDecision<E, V, C> {
    embedder: Arc<E>,
    index: Arc<V>,
    store: Arc<C>,
    match_threshold: f32,
}

impl<E: Embedder, V: VectorIndex, C: ContentStore> CacheDecision<E, V, C> {
    pub fn new(embedder: Arc<E>, index: Arc<V>, store: Arc<C>, match_threshold: f32) -> Self {
        Self {
            embedder,
            index,
            store,
            match_threshold,
        }
    }

    /// §4.1: "Flattens messages, obtains vector, queries index with top-K=1."
    /// The caller is responsible for flattening (see [`crate::payload`]);
    /// this takes the already-flattened text so it stays agnostic to the
    /// wire request shape.
    pub async fn decide(
        &self,
        flattened_prompt: &str,
        no_cache: bool,
    ) -> Result<DecisionOutcome, CacheError> {
        let vector = self.embedder.embed(flattened_prompt).await?;

        if no_cache {
            debug!("noCache set; bypassing index query");
            return Ok(DecisionOutcome::Miss { vector });
        }

        let result = self.index.query(&vector, TOP_K).await?;

        let Some(top) = result.top() else {
            return Ok(DecisionOutcome::Miss { vector });
        };

        // §8 invariant 6: score == threshold is a HIT (strictly-less-than
        // is the miss predicate).
        if result.count == 0 || top.score < self.match_threshold {
            return Ok(DecisionOutcome::Miss { vector });
        }

        match self.store.get(&top.id).await {
            Ok(Some(content)) => Ok(DecisionOutcome::Hit { content }),
            Ok(None) => {
                warn!(id = %top.id, score = top.score, "orphan vector: no content under matched id");
                Ok(DecisionOutcome::OrphanRepair {
                    vector,
                    orphan_id: top.id.clone(),
                })
            }
            // STORE_UNAVAILABLE on Get: treat as miss (§7).
            Err(e) => {
                warn!(error = %e, "content store unavailable on lookup; treating as miss");
                Ok(DecisionOutcome::Miss { vector })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::storage::InMemoryContentStore;
    use crate::vectordb::{QueryResult, SearchMatch, VectorIndexError, VectorPoint};

    /// Always answers with one match at a fixed score, independent of the
    /// query vector. A real cosine index can't be coaxed into an exact
    /// score on demand, so this is the only way to exercise the
    /// `score == match_threshold` boundary precisely.
    struct FixedScoreIndex {
        id: String,
        score: f32,
    }

    impl VectorIndex for FixedScoreIndex {
        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<QueryResult, VectorIndexError> {
            Ok(QueryResult {
                count: 1,
                matches: vec![SearchMatch {
                    id: self.id.clone(),
                    score: self.score,
                }],
            })
        }

        async fn insert(&self, _points: Vec<VectorPoint>) -> Result<(), VectorIndexError> {
            Ok(())
        }
    }

    async fn decision_with_score(score: f32, threshold: f32) -> CacheDecision<HashEmbedder, FixedScoreIndex, InMemoryContentStore> {
        let store = InMemoryContentStore::new();
        store.put("entry-1", "cached answer").await.unwrap();

        CacheDecision::new(
            Arc::new(HashEmbedder::new(8)),
            Arc::new(FixedScoreIndex {
                id: "entry-1".to_string(),
                score,
            }),
            Arc::new(store),
            threshold,
        )
    }

    #[tokio::test]
    async fn score_exactly_at_threshold_is_a_hit() {
        let threshold = 0.9;
        let decision = decision_with_score(threshold, threshold).await;

        let outcome = decision.decide("what is the capital of France?", false).await.unwrap();
        match outcome {
            DecisionOutcome::Hit { content } => assert_eq!(content, "cached answer"),
            _ => panic!("score == match_threshold must be a hit (spec.md §8 Testable Property 6)"),
        }
    }

    #[tokio::test]
    async fn score_just_below_threshold_is_a_miss() {
        let threshold = 0.9;
        let decision = decision_with_score(threshold - 0.0001, threshold).await;

        let outcome = decision.decide("what is the capital of France?", false).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Miss { .. }));
    }

    #[tokio::test]
    async fn no_cache_bypasses_an_otherwise_matching_index() {
        let threshold = 0.9;
        let decision = decision_with_score(1.0, threshold).await;

        let outcome = decision.decide("what is the capital of France?", true).await.unwrap();
        assert!(matches!(outcome, DecisionOutcome::Miss { .. }));
    }

    #[tokio::test]
    async fn matched_id_with_missing_content_is_an_orphan_repair() {
        let threshold = 0.9;
        let store = InMemoryContentStore::new();
        let decision = CacheDecision::new(
            Arc::new(HashEmbedder::new(8)),
            Arc::new(FixedScoreIndex {
                id: "orphan-1".to_string(),
                score: threshold,
            }),
            Arc::new(store),
            threshold,
        );

        let outcome = decision.decide("what is the capital of France?", false).await.unwrap();
        match outcome {
            DecisionOutcome::OrphanRepair { orphan_id, .. } => assert_eq!(orphan_id, "orphan-1"),
            _ => panic!("matched id with no content must repair, not miss silently"),
        }
    }
}
