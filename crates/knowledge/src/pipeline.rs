//! Retrieval pipeline: chunk, embed and index on write; embed and rank on read.

use crate::chunker::TextChunker;
use crate::config::KnowledgeBaseConfig;
use crate::embeddings::{create_provider, embed_in_batches, EmbeddingProvider};
use crate::index::{open_index, VectorIndex};
use crate::types::{
    Category, CollectionStats, CollectionStatus, Document, IndexEntry, Metadata, SearchResult,
};
use pqrs_core::{AppError, AppResult};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

/// Shared retrieval service over one collection.
///
/// Construct once per process and share behind an `Arc`. Queries run in
/// parallel; document writes and `clear` are serialized by a write gate held
/// across the embedding await and the inserts.
///
/// Writes are not atomic: a document whose write fails part-way may leave
/// some of its chunks in the index.
pub struct RetrievalPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: RwLock<Box<dyn VectorIndex>>,
    write_gate: Mutex<()>,
    chunker: TextChunker,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Box<dyn VectorIndex>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            embedder,
            index: RwLock::new(index),
            write_gate: Mutex::new(()),
            chunker,
        }
    }

    /// Build the embedder, index backend and chunker described by `config`.
    pub fn from_config(config: &KnowledgeBaseConfig, index_path: &Path) -> AppResult<Self> {
        config.validate()?;

        let embedder = create_provider(&config.embedding)?;
        let index = open_index(config, index_path)?;
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;

        tracing::debug!(
            collection = %config.name,
            backend = index.backend_name(),
            embedder = embedder.provider_name(),
            "Opened retrieval pipeline"
        );

        Ok(Self::new(embedder, index, chunker))
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn chunker(&self) -> &TextChunker {
        &self.chunker
    }

    fn read_index(&self) -> AppResult<RwLockReadGuard<'_, Box<dyn VectorIndex>>> {
        self.index
            .read()
            .map_err(|_| AppError::Index("Index lock poisoned".to_string()))
    }

    fn write_index(&self) -> AppResult<RwLockWriteGuard<'_, Box<dyn VectorIndex>>> {
        self.index
            .write()
            .map_err(|_| AppError::Index("Index lock poisoned".to_string()))
    }

    /// Chunk, embed and insert a document. Returns the number of chunks stored.
    ///
    /// Chunks are embedded and inserted one provider batch at a time; an error
    /// in a later batch leaves the earlier batches in the index.
    pub async fn try_add_document(&self, doc: &Document) -> AppResult<usize> {
        let _gate = self.write_gate.lock().await;

        let chunks = self.chunker.split(&doc.body);
        let batch_size = self.embedder.max_batch_size().max(1);
        let created_at = doc.created_at.to_rfc3339();

        for (batch_no, batch) in chunks.chunks(batch_size).enumerate() {
            let vectors = embed_in_batches(self.embedder.as_ref(), batch).await?;

            let mut index = self.write_index()?;
            for (offset, (text, vector)) in batch.iter().zip(vectors).enumerate() {
                let chunk_index = batch_no * batch_size + offset;
                index.insert(IndexEntry {
                    id: doc.chunk_id(chunk_index),
                    vector,
                    text: text.clone(),
                    category: doc.category,
                    metadata: chunk_metadata(doc, chunk_index, &created_at),
                })?;
            }
        }

        Ok(chunks.len())
    }

    /// Add a document, reporting only success or failure.
    pub async fn add_document(&self, doc: &Document) -> bool {
        match self.try_add_document(doc).await {
            Ok(chunks) => {
                tracing::info!(title = %doc.title, chunks, "Document added");
                true
            }
            Err(e) => {
                tracing::error!(title = %doc.title, error = %e, "Failed to add document");
                false
            }
        }
    }

    /// Embed `query` and return up to `k` ranked results.
    pub async fn try_search(
        &self,
        query: &str,
        k: usize,
        category: Option<Category>,
    ) -> AppResult<Vec<SearchResult>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let results = self.read_index()?.query(&vector, k, category)?;

        tracing::debug!(
            results = results.len(),
            k,
            category = category.map(|c| c.label()).unwrap_or("*"),
            "Search completed"
        );

        Ok(results)
    }

    /// Search, treating any failure as "no evidence".
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        category: Option<Category>,
    ) -> Vec<SearchResult> {
        match self.try_search(query, k, category).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(error = %e, k, "Search failed");
                Vec::new()
            }
        }
    }

    /// Remove every entry, waiting for in-flight writes to finish first.
    pub async fn try_clear(&self) -> AppResult<()> {
        let _gate = self.write_gate.lock().await;
        self.write_index()?.clear()
    }

    pub async fn clear(&self) -> bool {
        match self.try_clear().await {
            Ok(()) => {
                tracing::info!("Collection cleared");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear collection");
                false
            }
        }
    }

    pub fn count(&self) -> AppResult<usize> {
        self.read_index()?.count()
    }

    /// Health summary; index failures become the `error` status.
    pub fn stats(&self) -> CollectionStats {
        match self.count() {
            Ok(0) => CollectionStats {
                total_entries: 0,
                status: CollectionStatus::Empty,
            },
            Ok(total_entries) => CollectionStats {
                total_entries,
                status: CollectionStatus::Active,
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to read collection stats");
                CollectionStats {
                    total_entries: 0,
                    status: CollectionStatus::Error,
                }
            }
        }
    }
}

/// Document metadata plus the reserved chunk keys, which take precedence.
fn chunk_metadata(doc: &Document, chunk_index: usize, created_at: &str) -> Metadata {
    let mut metadata = doc.metadata.clone();
    metadata.insert("title".to_string(), doc.title.clone().into());
    metadata.insert("category".to_string(), doc.category.label().into());
    metadata.insert("chunk_index".to_string(), chunk_index.into());
    metadata.insert("created_at".to_string(), created_at.into());
    metadata
}
