//! Ragline Ingest - load, chunk, embed, upsert
//!
//! The ingestion pipeline is a straight line: load a document, split it
//! into overlapping chunks, request one embedding per chunk, upsert every
//! record into the vector index in a single call. An embed-or-upsert
//! failure is degraded to a report entry rather than an error so the run
//! still completes.

use std::sync::Arc;

use ragline_core::{Document, DocumentChunk, RaglineError, Result};
use ragline_vector::{ChunkRecord, EmbeddingClient, VectorIndex};

pub mod chunker;
pub mod loader;

pub use chunker::CharacterSplitter;
pub use loader::load_text_document;

// ============================================================================
// Ingestion Pipeline
// ============================================================================

/// Summary of one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Number of chunks produced from the document
    pub chunk_count: usize,

    /// Number of records upserted into the index
    pub upserted: usize,

    /// First line of the embed/upsert error, when that step failed
    pub upsert_error: Option<String>,
}

/// Sequential ingestion pipeline
pub struct IngestPipeline {
    splitter: CharacterSplitter,
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
}

impl IngestPipeline {
    /// Create a new pipeline
    pub fn new(
        splitter: CharacterSplitter,
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            splitter,
            embedder,
            index,
        }
    }

    /// Ingest one document
    ///
    /// Failures from the embedding or upsert calls do not propagate; the
    /// first line of the error lands in [`IngestReport::upsert_error`]
    /// and the run returns `Ok`.
    pub async fn run(&self, document: &Document) -> Result<IngestReport> {
        let chunks: Vec<DocumentChunk> = self
            .splitter
            .split(&document.content)
            .into_iter()
            .enumerate()
            .map(|(i, content)| DocumentChunk::new(&document.source, i as u32, content))
            .collect();

        tracing::info!("Split '{}' into {} chunks", document.source, chunks.len());

        let mut report = IngestReport {
            chunk_count: chunks.len(),
            ..IngestReport::default()
        };

        if chunks.is_empty() {
            return Ok(report);
        }

        match self.embed_and_upsert(&chunks).await {
            Ok(count) => report.upserted = count,
            Err(e) => {
                let message = first_line(&e);
                tracing::warn!("Failed to send chunks to the index: {message}");
                report.upsert_error = Some(message);
            }
        }

        Ok(report)
    }

    async fn embed_and_upsert(&self, chunks: &[DocumentChunk]) -> Result<usize> {
        let mut records = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            // One embedding request per chunk, sequentially
            let vector = self.embedder.embed(&chunk.content).await?;
            tracing::debug!("Embedded chunk {} of '{}'", chunk.chunk_index, chunk.source);
            records.push(ChunkRecord::from_chunk(chunk, vector));
        }

        self.index.upsert(&records).await?;
        Ok(records.len())
    }
}

fn first_line(error: &RaglineError) -> String {
    error
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::RetrievedChunk;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedEmbedder {
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingClient for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0.0; 4])
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RaglineError::EmbeddingError("model is loading".to_string()))
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    #[derive(Default)]
    struct RecordingIndex {
        upserts: Mutex<Vec<Vec<ChunkRecord>>>,
        fail_upsert: bool,
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn upsert(&self, records: &[ChunkRecord]) -> Result<()> {
            if self.fail_upsert {
                return Err(RaglineError::IndexError(
                    "connection refused\ncaused by: no route to host".to_string(),
                ));
            }
            self.upserts.lock().unwrap().push(records.to_vec());
            Ok(())
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<RetrievedChunk>> {
            Ok(Vec::new())
        }

        async fn delete_all(&self, _namespace: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn pipeline(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
    ) -> IngestPipeline {
        IngestPipeline::new(CharacterSplitter::new(10, 2).unwrap(), embedder, index)
    }

    #[tokio::test]
    async fn test_run_embeds_once_per_chunk_and_upserts_once() {
        let embedder = Arc::new(FixedEmbedder::new());
        let index = Arc::new(RecordingIndex::default());
        let pipeline = pipeline(embedder.clone(), index.clone());

        let document = Document::new("blog.txt", "x".repeat(26));
        let report = pipeline.run(&document).await.unwrap();

        // 26 chars, window 10, overlap 2 -> ceil(24 / 8) = 3 chunks
        assert_eq!(report.chunk_count, 3);
        assert_eq!(report.upserted, 3);
        assert!(report.upsert_error.is_none());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let records = &upserts[0];
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.source, "blog.txt");
            assert_eq!(record.chunk_index, i as u32);
        }
    }

    #[tokio::test]
    async fn test_upsert_failure_is_degraded_to_report_entry() {
        let index = Arc::new(RecordingIndex {
            fail_upsert: true,
            ..RecordingIndex::default()
        });
        let pipeline = pipeline(Arc::new(FixedEmbedder::new()), index);

        let document = Document::new("blog.txt", "some text to ingest");
        let report = pipeline.run(&document).await.unwrap();

        assert_eq!(report.upserted, 0);
        // Only the first line of the error is surfaced
        assert_eq!(
            report.upsert_error.as_deref(),
            Some("Index error: connection refused")
        );
    }

    #[tokio::test]
    async fn test_embedding_failure_is_degraded_and_skips_upsert() {
        let index = Arc::new(RecordingIndex::default());
        let pipeline = pipeline(Arc::new(FailingEmbedder), index.clone());

        let document = Document::new("blog.txt", "some text to ingest");
        let report = pipeline.run(&document).await.unwrap();

        assert_eq!(report.upserted, 0);
        assert!(report
            .upsert_error
            .as_deref()
            .unwrap()
            .contains("model is loading"));
        assert!(index.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_produces_no_calls() {
        let embedder = Arc::new(FixedEmbedder::new());
        let index = Arc::new(RecordingIndex::default());
        let pipeline = pipeline(embedder.clone(), index.clone());

        let report = pipeline.run(&Document::new("empty.txt", "")).await.unwrap();

        assert_eq!(report.chunk_count, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(index.upserts.lock().unwrap().is_empty());
    }
}
