//! Embedding client for generating vector representations
//!
//! Supports the hosted Hugging Face Inference API and local Ollama.

use async_trait::async_trait;
use ragline_core::{EmbeddingProvider, ModelConfig, RaglineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ============================================================================
// Embedding Trait
// ============================================================================

/// Trait for embedding generation
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimension
    fn dimension(&self) -> usize;
}

// ============================================================================
// Hugging Face Embedding Client
// ============================================================================

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/pipeline/feature-extraction";

/// Hugging Face Inference API embedding client
pub struct HuggingFaceEmbedding {
    client: Client,
    api_token: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct HfEmbeddingRequest {
    inputs: Vec<String>,
}

impl HuggingFaceEmbedding {
    /// Create a new Hugging Face embedding client
    pub fn new(api_token: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        // The collection must be created with the same dimension
        let dimension = match model.as_str() {
            "BAAI/bge-large-en-v1.5" => 1024,
            "BAAI/bge-base-en-v1.5" => 768,
            "BAAI/bge-small-en-v1.5" => 384,
            "sentence-transformers/all-MiniLM-L6-v2" => 384,
            _ => 1024, // Default
        };

        Self {
            client: Client::new(),
            api_token: api_token.into(),
            model,
            dimension,
        }
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_token = config
            .hf_api_token
            .as_ref()
            .ok_or_else(|| RaglineError::ConfigError("Hugging Face API token required".to_string()))?;

        Ok(Self::new(api_token.clone(), config.embed_model.clone()))
    }
}

#[async_trait]
impl EmbeddingClient for HuggingFaceEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = HfEmbeddingRequest {
            inputs: vec![text.to_string()],
        };

        let response = self
            .client
            .post(format!("{HF_INFERENCE_BASE}/{}", self.model))
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RaglineError::EmbeddingError(format!("Embedding request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RaglineError::EmbeddingError(format!(
                "Hugging Face embedding error: {error_text}"
            )));
        }

        let mut vectors: Vec<Vec<f32>> = response.json().await.map_err(|e| {
            RaglineError::EmbeddingError(format!("Failed to parse embedding response: {e}"))
        })?;

        if vectors.is_empty() {
            return Err(RaglineError::EmbeddingError(
                "No embedding returned".to_string(),
            ));
        }

        Ok(vectors.swap_remove(0))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ============================================================================
// Ollama Embedding Client
// ============================================================================

/// Ollama embedding API client
pub struct OllamaEmbedding {
    client: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct OllamaEmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedding {
    /// Create a new Ollama embedding client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimension = match model.as_str() {
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            "all-minilm" => 384,
            _ => 768, // Default for most models
        };

        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model,
            dimension,
        }
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.embed_model.clone())
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RaglineError::EmbeddingError(format!("Ollama embedding request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RaglineError::EmbeddingError(format!(
                "Ollama embedding error: {error_text}"
            )));
        }

        let result: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            RaglineError::EmbeddingError(format!("Failed to parse embedding response: {e}"))
        })?;

        Ok(result.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an embedding client from config
pub fn create_embedding_client(config: &ModelConfig) -> Result<Box<dyn EmbeddingClient>> {
    match config.embedding_provider {
        EmbeddingProvider::HuggingFace => Ok(Box::new(HuggingFaceEmbedding::from_config(config)?)),
        EmbeddingProvider::Ollama => Ok(Box::new(OllamaEmbedding::from_config(config))),
    }
}

// ============================================================================
// Tests
// ============================================================================
