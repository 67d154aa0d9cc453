//! Ragline RAG - the query pipeline
//!
//! One query is one straight line: embed the question, retrieve the
//! top-ranked chunks from the vector index, substitute context and
//! question into a fixed prompt template, generate an answer. Ranking and
//! result count are delegated entirely to the index; there is no local
//! re-ranking or filtering.

use std::sync::Arc;

use ragline_core::{LlmClient, Result, RetrievedChunk};
use ragline_vector::{EmbeddingClient, VectorIndex};

pub mod llm;

pub use llm::{create_llm_client, GroqClient, OllamaClient};

// ============================================================================
// Prompt
// ============================================================================

/// Build the answer prompt from retrieved context and the question
fn build_prompt(question: &str, retrieved: &[RetrievedChunk]) -> String {
    let context = retrieved
        .iter()
        .map(|chunk| chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the context to answer briefly and accurately.\n\n\
         Context:\n{context}\n\n\
         Question: {question}"
    )
}

// ============================================================================
// Query Pipeline
// ============================================================================

/// Answer plus the retrieved records it was grounded on, in rank order
#[derive(Debug, Clone)]
pub struct RagAnswer {
    /// Generated answer text
    pub answer: String,

    /// Retrieved chunks, for source attribution
    pub retrieved: Vec<RetrievedChunk>,
}

/// Sequential RAG query pipeline
pub struct RagPipeline {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    llm: Arc<dyn LlmClient>,
    top_k: usize,
}

impl RagPipeline {
    /// Create a new pipeline
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        llm: Arc<dyn LlmClient>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            top_k,
        }
    }

    /// Answer a question against the index
    ///
    /// External-call errors propagate to the caller; the query pipeline
    /// has no soft-failure path.
    pub async fn query(&self, question: &str) -> Result<RagAnswer> {
        let vector = self.embedder.embed(question).await?;
        tracing::debug!("Query embedded ({} dimensions)", vector.len());

        let retrieved = self.index.query(&vector, self.top_k).await?;
        tracing::info!("Retrieved {} chunks from the index", retrieved.len());

        let prompt = build_prompt(question, &retrieved);
        tracing::debug!("Calling LLM with prompt length: {} chars", prompt.len());
        let answer = self.llm.generate(&prompt).await?;

        Ok(RagAnswer { answer, retrieved })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::RaglineError;
    use ragline_vector::ChunkRecord;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingClient for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.25; 4])
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    struct StubIndex {
        calls: AtomicUsize,
        chunks: Vec<RetrievedChunk>,
    }

    #[async_trait]
    impl VectorIndex for StubIndex {
        async fn upsert(&self, _records: &[ChunkRecord]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<RetrievedChunk>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.chunks.clone())
        }

        async fn delete_all(&self, _namespace: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorIndex for FailingIndex {
        async fn upsert(&self, _records: &[ChunkRecord]) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<RetrievedChunk>> {
            Err(RaglineError::IndexError("search failed".to_string()))
        }

        async fn delete_all(&self, _namespace: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    struct CapturingLlm {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmClient for CapturingLlm {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("a grounded answer".to_string())
        }
    }

    fn retrieved(content: &str, source: &str) -> RetrievedChunk {
        RetrievedChunk {
            content: content.to_string(),
            score: 0.9,
            metadata: HashMap::from([("source".to_string(), source.to_string())]),
        }
    }

    #[tokio::test]
    async fn test_query_makes_exactly_one_call_per_stage() {
        let embedder = Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
        });
        let index = Arc::new(StubIndex {
            calls: AtomicUsize::new(0),
            chunks: vec![retrieved("Pinecone is a vector database.", "blog.txt")],
        });
        let llm = Arc::new(CapturingLlm {
            prompts: Mutex::new(Vec::new()),
        });

        let pipeline = RagPipeline::new(embedder.clone(), index.clone(), llm.clone(), 4);
        let result = pipeline.query("What is Pinecone?").await.unwrap();

        assert_eq!(result.answer, "a grounded answer");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(index.calls.load(Ordering::SeqCst), 1);
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contains_question_and_context() {
        let index = Arc::new(StubIndex {
            calls: AtomicUsize::new(0),
            chunks: vec![
                retrieved("Pinecone is a vector database.", "blog.txt"),
                retrieved("It stores embeddings.", "blog.txt"),
            ],
        });
        let llm = Arc::new(CapturingLlm {
            prompts: Mutex::new(Vec::new()),
        });

        let pipeline = RagPipeline::new(
            Arc::new(CountingEmbedder {
                calls: AtomicUsize::new(0),
            }),
            index,
            llm.clone(),
            4,
        );
        pipeline.query("What is Pinecone?").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains("What is Pinecone?"));
        assert!(prompts[0].contains("Pinecone is a vector database."));
        assert!(prompts[0].contains("It stores embeddings."));
    }

    #[tokio::test]
    async fn test_retrieved_chunks_keep_rank_order() {
        let index = Arc::new(StubIndex {
            calls: AtomicUsize::new(0),
            chunks: vec![
                retrieved("first ranked", "a.txt"),
                retrieved("second ranked", "b.txt"),
            ],
        });
        let pipeline = RagPipeline::new(
            Arc::new(CountingEmbedder {
                calls: AtomicUsize::new(0),
            }),
            index,
            Arc::new(CapturingLlm {
                prompts: Mutex::new(Vec::new()),
            }),
            4,
        );

        let result = pipeline.query("anything").await.unwrap();
        assert_eq!(result.retrieved[0].content, "first ranked");
        assert_eq!(result.retrieved[1].content, "second ranked");
        assert_eq!(result.retrieved[0].source_label(), "a.txt");
    }

    #[tokio::test]
    async fn test_index_failure_propagates() {
        let pipeline = RagPipeline::new(
            Arc::new(CountingEmbedder {
                calls: AtomicUsize::new(0),
            }),
            Arc::new(FailingIndex),
            Arc::new(CapturingLlm {
                prompts: Mutex::new(Vec::new()),
            }),
            4,
        );

        let err = pipeline.query("anything").await.unwrap_err();
        assert!(matches!(err, RaglineError::IndexError(_)));
    }

    #[test]
    fn test_prompt_template_shape() {
        let prompt = build_prompt("Q?", &[retrieved("C.", "s.txt")]);
        assert!(prompt.starts_with("Use the context"));
        assert!(prompt.contains("Context:\nC."));
        assert!(prompt.ends_with("Question: Q?"));
    }
}
