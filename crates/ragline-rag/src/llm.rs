//! LLM client implementations
//!
//! Groq exposes an OpenAI-compatible chat-completions API; Ollama is the
//! local fallback. Both are plain blocking round trips behind the
//! [`LlmClient`] trait.

use async_trait::async_trait;
use ragline_core::{LlmClient, LlmProvider, ModelConfig, RaglineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

// ============================================================================
// Groq Client
// ============================================================================

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Groq chat-completions client
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl GroqClient {
    /// Create a new Groq client
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GROQ_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .groq_api_key
            .as_ref()
            .ok_or_else(|| RaglineError::ConfigError("Groq API key required".to_string()))?;

        Ok(Self::new(api_key.clone(), config.llm_model.clone()))
    }

    /// Set a custom base URL (for compatible APIs)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RaglineError::LlmError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RaglineError::LlmError(format!("Groq error: {error_text}")));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| RaglineError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| RaglineError::LlmError("No response generated".to_string()))
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create from config
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(config.ollama_url.clone(), config.llm_model.clone())
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| RaglineError::LlmError(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RaglineError::LlmError(format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| RaglineError::LlmError(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.response)
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(config: &ModelConfig) -> Result<Box<dyn LlmClient>> {
    match config.llm_provider {
        LlmProvider::Groq => Ok(Box::new(GroqClient::from_config(config)?)),
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::from_config(config))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_client_creation() {
        let client = GroqClient::new("gsk_key", "llama-3.1-8b-instant");
        assert_eq!(client.model, "llama-3.1-8b-instant");
        assert_eq!(client.base_url, GROQ_BASE_URL);
    }

    #[test]
    fn test_groq_from_config_requires_key() {
        let config = ModelConfig::default();
        assert!(GroqClient::from_config(&config).is_err());
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", "llama3");
        assert_eq!(client.model, "llama3");
    }
}
