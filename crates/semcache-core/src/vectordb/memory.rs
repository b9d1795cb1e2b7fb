use std::collections::HashMap;

use parking_lot::RwLock;

use super::error::VectorIndexError;
use super::model::{QueryResult, SearchMatch, VectorPoint};
use super::VectorIndex;

/// Brute-force cosine-similarity index held entirely in memory.
///
/// Used as the default `VectorIndex` when no external backend is configured,
/// and directly in tests (it's deterministic and needs no running service).
/// Non-goal per spec.md §1: this does not implement an approximate
/// nearest-neighbor algorithm, only exact linear scan — fine for the
/// dataset sizes this is meant to stand in for.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    points: RwLock<HashMap<String, Vec<f32>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VectorIndex for InMemoryVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult, VectorIndexError> {
        let points = self.points.read();
        let mut matches: Vec<SearchMatch> = points
            .iter()
            .map(|(id, v)| SearchMatch {
                id: id.clone(),
                score: cosine_similarity(vector, v),
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        Ok(QueryResult {
            count: points.len(),
            matches,
        })
    }

    async fn insert(&self, points: Vec<VectorPoint>) -> Result<(), VectorIndexError> {
        let mut guard = self.points.write();
        for point in points {
            guard.insert(point.id, point.values);
        }
        Ok(())
    }
}

/// Cosine similarity in `[-1, 1]`. Returns `0.0` for empty, mismatched-length,
/// or zero-norm vectors rather than panicking or producing NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let a = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[tokio::test]
    async fn query_orders_by_descending_score() {
        let index = InMemoryVectorIndex::new();
        index
            .insert(vec![
                VectorPoint::new("a", vec![1.0, 0.0]),
                VectorPoint::new("b", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let result = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.matches[0].id, "a");
        assert!(result.matches[0].score > result.matches[1].score);
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_id() {
        let index = InMemoryVectorIndex::new();
        index
            .insert(vec![VectorPoint::new("a", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .insert(vec![VectorPoint::new("a", vec![0.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn query_against_empty_index_is_miss() {
        let index = InMemoryVectorIndex::new();
        let result = index.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(result.count, 0);
        assert!(result.top().is_none());
    }
}
