//! Qdrant implementation of the vector index
//!
//! Maps chunk records to Qdrant points. Namespaces are a `namespace`
//! payload field: namespace-scoped deletes filter on it, a whole-index
//! delete matches every point.

use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use ragline_core::{IndexConfig, RaglineError, Result, RetrievedChunk};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChunkRecord, VectorIndex};

/// Qdrant-backed vector index
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

/// Payload stored with each vector
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChunkPayload {
    content: String,
    source: String,
    chunk_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

impl QdrantIndex {
    /// Connect to the index named by the configuration
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let url = config
            .url
            .as_ref()
            .ok_or_else(|| RaglineError::ConfigError("Qdrant URL required".to_string()))?;
        let collection = config
            .collection
            .as_ref()
            .ok_or_else(|| RaglineError::ConfigError("Qdrant collection required".to_string()))?;

        let mut builder = Qdrant::from_url(url);
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RaglineError::IndexError(format!("Qdrant connection failed: {e}")))?;

        Ok(Self {
            client,
            collection: collection.clone(),
        })
    }

    /// Create the collection if it is absent
    ///
    /// `dimension` must match the embedding model; the index service
    /// rejects mismatched vectors at upsert/query time.
    pub async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| RaglineError::IndexError(format!("Failed to list collections: {e}")))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| {
                    RaglineError::IndexError(format!("Failed to create collection: {e}"))
                })?;
            tracing::info!(
                "Created collection '{}' with dimension {}",
                self.collection,
                dimension
            );
        }

        Ok(())
    }
}

/// Scope a delete to a namespace, or to every point when none is given
fn delete_filter(namespace: Option<&str>) -> Filter {
    match namespace {
        Some(ns) => Filter::must([Condition::matches("namespace", ns.to_string())]),
        None => Filter::default(),
    }
}

#[async_trait::async_trait]
impl VectorIndex for QdrantIndex {
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
        let points: Vec<PointStruct> = records
            .iter()
            .map(|record| {
                let payload = ChunkPayload {
                    content: record.content.clone(),
                    source: record.source.clone(),
                    chunk_index: record.chunk_index,
                    namespace: record.namespace.clone(),
                };

                let payload_map: HashMap<String, qdrant_client::qdrant::Value> =
                    serde_json::to_value(&payload)
                        .unwrap_or_default()
                        .as_object()
                        .cloned()
                        .unwrap_or_default()
                        .into_iter()
                        .map(|(k, v)| (k, v.into()))
                        .collect();

                PointStruct::new(record.id.to_string(), record.vector.clone(), payload_map)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| RaglineError::IndexError(format!("Failed to upsert vectors: {e}")))?;

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| RaglineError::IndexError(format!("Vector search failed: {e}")))?;

        let retrieved = results
            .result
            .into_iter()
            .map(|point| {
                let payload = point.payload;
                let content = payload
                    .get("content")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
                    .unwrap_or_default();

                let mut metadata: HashMap<String, String> = HashMap::new();
                for (key, value) in &payload {
                    if key == "content" {
                        continue;
                    }
                    match &value.kind {
                        Some(Kind::StringValue(s)) => {
                            metadata.insert(key.clone(), s.clone());
                        }
                        Some(Kind::IntegerValue(n)) => {
                            metadata.insert(key.clone(), n.to_string());
                        }
                        _ => {}
                    }
                }

                RetrievedChunk {
                    content,
                    score: point.score,
                    metadata,
                }
            })
            .collect();

        Ok(retrieved)
    }

    async fn delete_all(&self, namespace: Option<&str>) -> Result<()> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection).points(delete_filter(namespace)),
            )
            .await
            .map_err(|e| RaglineError::IndexError(format!("Failed to delete vectors: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_filter_unscoped_matches_everything() {
        let filter = delete_filter(None);
        assert!(filter.must.is_empty());
        assert!(filter.should.is_empty());
        assert!(filter.must_not.is_empty());
    }

    #[test]
    fn test_delete_filter_scoped_to_namespace() {
        let filter = delete_filter(Some("drafts"));
        assert_eq!(filter.must.len(), 1);
    }

    #[test]
    fn test_new_requires_url_and_collection() {
        let config = IndexConfig::default();
        assert!(QdrantIndex::new(&config).is_err());
    }
}
