//! `BackgroundWriter` (spec.md §4.9).

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::hashing::generate_id;
use crate::storage::ContentStore;
use crate::streaming::{extract_content, CaptureOutcome};
use crate::vectordb::{VectorIndex, VectorPoint};

/// What to do with the extracted text once a capture is admitted.
pub enum AdmissionPlan {
    /// Ordinary miss: mint a fresh id, write content, then insert the
    /// vector computed at decision time.
    NewEntry { vector: Vec<f32> },
    /// §4.1 orphan repair: a vector already exists under `id`; only the
    /// content record needs writing.
    OrphanRepair { id: String },
}

/// Waits for `capture` (bounded by `deadline`), and on a "done" capture with
/// non-empty, successfully-parsed content, commits per `plan`.
///
/// Ordering invariant (§4.9, §8 property 3): content is always persisted
/// before the vector, so `ContentStore.Get(id)` is non-empty the instant
/// `VectorIndex.Insert` completes.
pub struct BackgroundWriter<V, C> {
    index: Arc<V>,
    store: Arc<C>,
    deadline: Duration,
}

impl<V: VectorIndex, C: ContentStore> BackgroundWriter<V, C> {
    pub fn new(index: Arc<V>, store: Arc<C>, deadline: Duration) -> Self {
        Self {
            index,
            store,
            deadline,
        }
    }

    pub async fn commit(
        &self,
        capture: tokio::task::JoinHandle<CaptureOutcome>,
        plan: AdmissionPlan,
    ) {
        let outcome = match tokio::time::timeout(self.deadline, capture).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                warn!(error = %join_err, "capture task failed; discarding background write");
                return;
            }
            Err(_) => {
                warn!(deadline_ms = self.deadline.as_millis(), "background deadline exceeded; discarding write");
                return;
            }
        };

        // Admission policy (§4.9): discard with no error if Capture is not
        // "done", if extracted text is empty, or if parsing failed.
        if outcome.overflowed {
            warn!("capture overflowed; discarding background write");
            return;
        }
        if !outcome.done {
            warn!("capture did not end cleanly; discarding background write");
            return;
        }

        let text = match extract_content(&outcome.bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "chunk parsing failed; discarding background write");
                return;
            }
        };

        if text.is_empty() {
            warn!("extracted content was empty; discarding background write");
            return;
        }

        self.admit(plan, &text).await;
    }

    /// Commits an already-extracted completion (the non-streaming path,
    /// which never goes through StreamTee since the body arrives whole).
    pub async fn commit_text(&self, plan: AdmissionPlan, text: &str) {
        if text.is_empty() {
            warn!("extracted content was empty; discarding background write");
            return;
        }
        self.admit(plan, text).await;
    }

    async fn admit(&self, plan: AdmissionPlan, text: &str) {
        match plan {
            AdmissionPlan::NewEntry { vector } => {
                let id = generate_id();
                if let Err(e) = self.store.put(&id, text).await {
                    // STORE_UNAVAILABLE on Put (§7): discard, don't fail
                    // the foreground response (already delivered).
                    warn!(error = %e, id, "content store put failed; discarding background write");
                    return;
                }
                if let Err(e) = self.index.insert(vec![VectorPoint::new(id.clone(), vector)]).await {
                    warn!(error = %e, id, "vector index insert failed after content was persisted");
                    return;
                }
                info!(id, "admitted new cache entry");
            }
            AdmissionPlan::OrphanRepair { id } => {
                if let Err(e) = self.store.put(&id, text).await {
                    warn!(error = %e, id, "orphan repair put failed");
                    return;
                }
                info!(id, "repaired orphan vector with fresh content");
            }
        }
    }
}
