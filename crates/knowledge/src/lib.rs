//! Knowledge base and retrieval engine for the PQRS assistant.
//!
//! Chunks reference documents, embeds them, stores them in a vector index
//! with a category column, and answers complaints from the retrieved
//! evidence.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod rag;
pub mod scoring;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::TextChunker;
pub use config::KnowledgeBaseConfig;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{open_index, IndexBackend, MemoryIndex, SqliteIndex, VectorIndex};
pub use pipeline::RetrievalPipeline;
pub use rag::ComplaintResponder;
pub use scoring::confidence;
pub use types::{
    Category, CollectionStats, CollectionStatus, ComplaintRequest, ComplaintResponse,
    ComplaintType, Document, IndexEntry, Metadata, SearchResult,
};

use pqrs_core::AppResult;
use std::path::Path;

/// Open the retrieval pipeline for a workspace collection.
///
/// Creates `.pqrs/knowledge/<collection>/config.yaml` with defaults on first
/// use.
pub fn open_pipeline(
    workspace: &Path,
    collection: &str,
) -> AppResult<(KnowledgeBaseConfig, RetrievalPipeline)> {
    let config = KnowledgeBaseConfig::load_or_init(workspace, collection)?;
    let index_path = config::get_index_path(workspace, collection);
    let pipeline = RetrievalPipeline::from_config(&config, &index_path)?;

    tracing::debug!(
        collection,
        backend = ?config.index_backend,
        "Opened knowledge base"
    );

    Ok((config, pipeline))
}
