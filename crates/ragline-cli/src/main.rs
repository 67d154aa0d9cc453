//! Ragline CLI - Command-line interface
//!
//! Usage:
//!   ragline ingest <path>
//!   ragline query <question>
//!   ragline cleanup

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ragline_core::{AppConfig, LlmClient};
use ragline_ingest::{load_text_document, CharacterSplitter, IngestPipeline};
use ragline_rag::{create_llm_client, RagPipeline};
use ragline_vector::{
    create_embedding_client, purge_index, EmbeddingClient, QdrantIndex, VectorIndex,
};

/// Namespace cleared by `ragline cleanup`
///
/// Set to `Some("...")` to clear a single namespace; `None` clears the
/// entire index across all namespaces.
const CLEANUP_NAMESPACE: Option<&str> = None;

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Minimal RAG pipelines: ingest, query, cleanup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a text document into the vector index
    Ingest {
        /// Path to a UTF-8 text file
        path: PathBuf,
    },
    /// Answer a question against the index
    Query {
        /// Question to ask
        question: String,
    },
    /// Delete all vectors from the index
    Cleanup,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragline=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Ingest { path } => ingest(&config, &path).await,
        Commands::Query { question } => query(&config, &question).await,
        Commands::Cleanup => cleanup(&config).await,
    }
}

async fn ingest(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    config.validate_for_ingestion()?;

    let embedder: Arc<dyn EmbeddingClient> = create_embedding_client(&config.models)?.into();
    let index = QdrantIndex::new(&config.index)?;
    index.ensure_collection(embedder.dimension()).await?;
    let index: Arc<dyn VectorIndex> = Arc::new(index);

    let document = load_text_document(path)?;
    println!(
        "Loaded document '{}' ({} chars)",
        document.source,
        document.content.chars().count()
    );

    let splitter = CharacterSplitter::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
    let pipeline = IngestPipeline::new(splitter, embedder, index);
    let report = pipeline.run(&document).await?;

    println!("Created {} chunks", report.chunk_count);
    match report.upsert_error {
        // Soft failure: the message is printed and the process still exits 0
        Some(message) => println!("Failed to send chunks to the index: {message}"),
        None => println!("Upserted {} records. Done.", report.upserted),
    }

    Ok(())
}

async fn query(config: &AppConfig, question: &str) -> anyhow::Result<()> {
    config.validate_for_query()?;

    let embedder: Arc<dyn EmbeddingClient> = create_embedding_client(&config.models)?.into();
    let index: Arc<dyn VectorIndex> = Arc::new(QdrantIndex::new(&config.index)?);
    let llm: Arc<dyn LlmClient> = create_llm_client(&config.models)?.into();

    let pipeline = RagPipeline::new(embedder, index, llm, config.rag.top_k);
    let result = pipeline.query(question).await?;

    println!("Answer:\n{}", result.answer);
    if !result.retrieved.is_empty() {
        println!("\nSources:");
        for (i, chunk) in result.retrieved.iter().enumerate() {
            println!("{}. {}", i + 1, chunk.source_label());
        }
    }

    Ok(())
}

async fn cleanup(config: &AppConfig) -> anyhow::Result<()> {
    config.validate_for_cleanup()?;

    let collection = config.index.collection.as_deref().unwrap_or_default();
    match CLEANUP_NAMESPACE {
        Some(ns) => println!("Deleting all vectors from '{collection}' in namespace '{ns}'..."),
        None => println!("Deleting all vectors from '{collection}' (all namespaces)..."),
    }

    let index = QdrantIndex::new(&config.index)?;
    purge_index(&index, CLEANUP_NAMESPACE).await?;

    println!("Done. Vectors removed.");
    Ok(())
}
