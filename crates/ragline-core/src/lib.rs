//! Ragline Core - Domain models, traits, and shared types
//!
//! This crate defines the abstractions shared by the three ragline
//! pipelines:
//! - Document and chunk models
//! - Retrieval result types
//! - Common error types
//! - The LLM client trait
//! - Configuration management

pub mod config;

pub use config::{AppConfig, ConfigError, EmbeddingProvider, IndexConfig, LlmProvider, ModelConfig, RagConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for ragline operations
#[derive(Error, Debug)]
pub enum RaglineError {
    #[error("Document error: {0}")]
    DocumentError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RaglineError>;

// ============================================================================
// Document Models
// ============================================================================

/// A source document loaded for ingestion
///
/// Exists only within a single ingestion run; the persisted form is
/// owned by the external vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier (file path for local documents)
    pub source: String,

    /// Full text content
    pub content: String,
}

impl Document {
    /// Create a new document
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// A chunk of document content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Unique identifier, used as the vector point id
    pub id: Uuid,

    /// Source identifier inherited from the parent document
    pub source: String,

    /// Chunk index within the document
    pub chunk_index: u32,

    /// Text content
    pub content: String,
}

impl DocumentChunk {
    /// Create a new chunk
    pub fn new(source: impl Into<String>, chunk_index: u32, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            chunk_index,
            content: content.into(),
        }
    }
}

// ============================================================================
// Retrieval Types
// ============================================================================

/// Metadata keys tried, in order, when labelling a retrieved chunk
const SOURCE_METADATA_KEYS: [&str; 2] = ["source", "id"];

/// One ranked result returned by the vector index at query time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Stored chunk text
    pub content: String,

    /// Similarity score assigned by the index (higher is better)
    pub score: f32,

    /// Stored payload metadata
    pub metadata: HashMap<String, String>,
}

impl RetrievedChunk {
    /// Best-effort source attribution for display
    ///
    /// Falls back through `source`, then `id`, then a literal placeholder.
    pub fn source_label(&self) -> &str {
        SOURCE_METADATA_KEYS
            .iter()
            .find_map(|key| self.metadata.get(*key))
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for LLM clients
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============================================================================
// Tests
// ============================================================================
