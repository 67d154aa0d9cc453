//! Ragline Vector - Vector index abstraction
//!
//! Provides the trait for the external managed vector index, the record
//! type handed to it, and the cleanup operation. The Qdrant implementation
//! lives in [`qdrant_store`], the hosted embedding clients in [`embedding`].

use async_trait::async_trait;
use ragline_core::{DocumentChunk, Result, RetrievedChunk};
use uuid::Uuid;

pub mod embedding;
pub mod qdrant_store;

pub use embedding::{create_embedding_client, EmbeddingClient, HuggingFaceEmbedding, OllamaEmbedding};
pub use qdrant_store::QdrantIndex;

/// A chunk ready for upsert: embedding vector plus stored payload
///
/// Persisted records are owned entirely by the external index; this type
/// only describes what gets sent there.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    /// Vector point id
    pub id: Uuid,

    /// Embedding vector; its dimensionality must match the collection
    pub vector: Vec<f32>,

    /// Chunk text, stored as payload for retrieval
    pub content: String,

    /// Source identifier inherited from the document
    pub source: String,

    /// Chunk index within the document
    pub chunk_index: u32,

    /// Logical partition within the index, if any
    pub namespace: Option<String>,
}

impl ChunkRecord {
    /// Pair a chunk with its embedding vector
    pub fn from_chunk(chunk: &DocumentChunk, vector: Vec<f32>) -> Self {
        Self {
            id: chunk.id,
            vector,
            content: chunk.content.clone(),
            source: chunk.source.clone(),
            chunk_index: chunk.chunk_index,
            namespace: None,
        }
    }
}

/// Trait for vector index operations
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Upsert a list of records in a single call
    async fn upsert(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Retrieve the `top_k` records most similar to the query vector,
    /// ranked by the index service
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Delete every record, optionally scoped to a namespace
    async fn delete_all(&self, namespace: Option<&str>) -> Result<()>;
}

/// Cleanup pipeline: unconditionally remove all vectors from the index
///
/// With a namespace, the delete is scoped to that namespace only;
/// without one it covers the entire index. Not confirmed, not reversible.
pub async fn purge_index(index: &dyn VectorIndex, namespace: Option<&str>) -> Result<()> {
    match namespace {
        Some(ns) => tracing::info!("Deleting all vectors in namespace '{ns}'"),
        None => tracing::info!("Deleting all vectors across all namespaces"),
    }
    index.delete_all(namespace).await
}

// ============================================================================
// Tests
// ============================================================================
