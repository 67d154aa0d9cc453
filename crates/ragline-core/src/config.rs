//! Ragline Configuration Management
//!
//! All three pipelines are configured from environment variables only.
//! Each pipeline validates the subset of settings it needs up front and
//! fails with a single message naming every missing variable, before any
//! external call is made.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Vector index connection
    pub index: IndexConfig,

    /// Embedding and LLM provider configuration
    pub models: ModelConfig,

    /// Chunking and retrieval parameters
    pub rag: RagConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Vector index
        if let Ok(url) = std::env::var("QDRANT_URL") {
            config.index.url = Some(url);
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            config.index.api_key = Some(key);
        }
        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            config.index.collection = Some(collection);
        }

        // Embedding provider
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.models.embedding_provider = provider.parse()?;
        }
        if let Ok(token) = std::env::var("HUGGINGFACEHUB_API_TOKEN") {
            config.models.hf_api_token = Some(token);
        }
        if let Ok(model) = std::env::var("HF_EMBED_MODEL") {
            config.models.embed_model = model;
        }

        // LLM provider
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.models.llm_provider = provider.parse()?;
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            config.models.groq_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GROQ_LLM_MODEL") {
            config.models.llm_model = model;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.models.ollama_url = url;
        }

        // Chunking and retrieval
        if let Ok(size) = std::env::var("CHUNK_SIZE") {
            config.rag.chunk_size = size.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CHUNK_SIZE".to_string(),
                value: size,
            })?;
        }
        if let Ok(overlap) = std::env::var("CHUNK_OVERLAP") {
            config.rag.chunk_overlap = overlap.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CHUNK_OVERLAP".to_string(),
                value: overlap,
            })?;
        }
        if let Ok(top_k) = std::env::var("QUERY_TOP_K") {
            config.rag.top_k = top_k.parse().map_err(|_| ConfigError::InvalidValue {
                key: "QUERY_TOP_K".to_string(),
                value: top_k,
            })?;
        }

        Ok(config)
    }

    /// Validate settings required by the ingestion pipeline
    pub fn validate_for_ingestion(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        self.collect_missing_embedding_vars(&mut missing);
        self.collect_missing_index_vars(&mut missing);
        fail_if_missing(missing)?;

        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::InvalidValue {
                key: "CHUNK_OVERLAP".to_string(),
                value: format!(
                    "{} (must be smaller than CHUNK_SIZE {})",
                    self.rag.chunk_overlap, self.rag.chunk_size
                ),
            });
        }

        Ok(())
    }

    /// Validate settings required by the cleanup pipeline
    pub fn validate_for_cleanup(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        self.collect_missing_index_vars(&mut missing);
        fail_if_missing(missing)
    }

    /// Validate settings required by the query pipeline
    pub fn validate_for_query(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        self.collect_missing_embedding_vars(&mut missing);
        self.collect_missing_index_vars(&mut missing);
        self.collect_missing_llm_vars(&mut missing);
        fail_if_missing(missing)
    }

    fn collect_missing_index_vars(&self, missing: &mut Vec<&'static str>) {
        if self.index.url.is_none() {
            missing.push("QDRANT_URL");
        }
        if self.index.collection.is_none() {
            missing.push("QDRANT_COLLECTION");
        }
    }

    fn collect_missing_embedding_vars(&self, missing: &mut Vec<&'static str>) {
        if self.models.embedding_provider == EmbeddingProvider::HuggingFace
            && self.models.hf_api_token.is_none()
        {
            missing.push("HUGGINGFACEHUB_API_TOKEN");
        }
    }

    fn collect_missing_llm_vars(&self, missing: &mut Vec<&'static str>) {
        if self.models.llm_provider == LlmProvider::Groq && self.models.groq_api_key.is_none() {
            missing.push("GROQ_API_KEY");
        }
    }
}

fn fail_if_missing(missing: Vec<&'static str>) -> Result<(), ConfigError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingRequired(missing.join(", ")))
    }
}

/// Vector index connection configuration
///
/// The collection name is the index identifier; the URL (plus the
/// optional API key for hosted deployments) is the credential.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    /// Qdrant endpoint URL
    pub url: Option<String>,

    /// Qdrant API key (unset for unauthenticated local instances)
    pub api_key: Option<String>,

    /// Collection name
    pub collection: Option<String>,
}

/// Embedding and LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Embedding provider to use
    pub embedding_provider: EmbeddingProvider,

    /// Hugging Face Inference API token
    pub hf_api_token: Option<String>,

    /// Embedding model name
    pub embed_model: String,

    /// LLM provider to use
    pub llm_provider: LlmProvider,

    /// Groq API key
    pub groq_api_key: Option<String>,

    /// LLM model name
    pub llm_model: String,

    /// Ollama server URL (local fallback for both roles)
    pub ollama_url: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_provider: EmbeddingProvider::HuggingFace,
            hf_api_token: None,
            embed_model: "BAAI/bge-large-en-v1.5".to_string(),
            llm_provider: LlmProvider::Groq,
            groq_api_key: None,
            llm_model: "llama-3.1-8b-instant".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
        }
    }
}

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    HuggingFace,
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "EMBEDDING_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    Ollama,
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "ollama" => Ok(Self::Ollama),
            _ => Err(ConfigError::InvalidValue {
                key: "LLM_PROVIDER".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Chunking and retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Number of results requested from the index at query time
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 4,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
