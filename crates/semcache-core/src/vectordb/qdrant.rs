use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;

use super::error::VectorIndexError;
use super::model::{QueryResult, SearchMatch, VectorPoint};
use super::VectorIndex;

pub const DEFAULT_COLLECTION_NAME: &str = "semcache_entries";

/// `VectorIndex` backed by a real Qdrant deployment.
///
/// Delegates the actual nearest-neighbor search to Qdrant, per spec.md §1's
/// non-goal of "implementing the nearest-neighbor index itself" — this is
/// the interface the core consumes, not an ANN implementation.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    vector_size: u64,
}

impl QdrantVectorIndex {
    pub async fn connect(
        url: &str,
        vector_size: u64,
    ) -> Result<Self, VectorIndexError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorIndexError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let index = Self {
            client,
            collection: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size,
        };
        index.ensure_collection().await?;
        Ok(index)
    }

    async fn ensure_collection(&self) -> Result<(), VectorIndexError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorIndexError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        if exists {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.vector_size, Distance::Cosine)),
            )
            .await
            .map_err(|e| VectorIndexError::CreateCollectionFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

impl VectorIndex for QdrantVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<QueryResult, VectorIndexError> {
        let result = self
            .client
            .search_points(SearchPointsBuilder::new(
                &self.collection,
                vector.to_vec(),
                top_k as u64,
            ))
            .await
            .map_err(|e| VectorIndexError::QueryFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let matches: Vec<SearchMatch> = result
            .result
            .into_iter()
            .filter_map(|point| {
                let id = point.id?.point_id_options.and_then(|opt| match opt {
                    qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid) => Some(uuid),
                    qdrant_client::qdrant::point_id::PointIdOptions::Num(n) => Some(n.to_string()),
                })?;
                Some(SearchMatch {
                    id,
                    score: point.score,
                })
            })
            .collect();

        // Qdrant doesn't report total collection size in a search response;
        // treat a non-empty match list as evidence the collection is
        // non-empty, which is all the §4.1 decision rule needs.
        Ok(QueryResult {
            count: matches.len(),
            matches,
        })
    }

    async fn insert(&self, points: Vec<VectorPoint>) -> Result<(), VectorIndexError> {
        if points.is_empty() {
            return Ok(());
        }

        for point in &points {
            if point.values.len() as u64 != self.vector_size {
                return Err(VectorIndexError::InvalidDimension {
                    expected: self.vector_size as usize,
                    actual: point.values.len(),
                });
            }
        }

        let qdrant_points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                PointStruct::new(
                    p.id,
                    p.values,
                    std::collections::HashMap::<String, qdrant_client::qdrant::Value>::new(),
                )
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, qdrant_points).wait(true))
            .await
            .map_err(|e| VectorIndexError::InsertFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}
