//! Vector index abstraction for knowledge chunks.
//!
//! Defines a trait for backend-agnostic vector storage and retrieval, the
//! cosine distance every backend ranks by, and the backend factory.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::config::KnowledgeBaseConfig;
use crate::types::{Category, IndexEntry, SearchResult};
use pqrs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trait for vector index backends.
///
/// Implementations must support:
/// - Inserting entries (duplicate ids are stored side by side and both are
///   returned by queries; nothing is overwritten)
/// - Category-filtered top-k search by cosine distance, ties in insertion order
/// - Counting and clearing
///
/// The first insert fixes the vector dimensionality. Inserts and queries with
/// another length fail with `AppError::Index` until `clear` releases it.
pub trait VectorIndex: Send + Sync {
    /// Backend identifier ("memory", "sqlite").
    fn backend_name(&self) -> &str;

    /// Append one entry.
    fn insert(&mut self, entry: IndexEntry) -> AppResult<()>;

    /// Up to `k` entries ranked by ascending distance to `vector`.
    ///
    /// An empty index yields an empty result, not an error.
    fn query(
        &self,
        vector: &[f32],
        k: usize,
        category: Option<Category>,
    ) -> AppResult<Vec<SearchResult>>;

    /// Remove every entry.
    fn clear(&mut self) -> AppResult<()>;

    /// Total entries currently stored.
    fn count(&self) -> AppResult<usize>;

    /// Dimensionality fixed by the first insert, if any.
    fn dimensions(&self) -> Option<usize>;
}

/// Storage backend for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Open the index backend selected by `config`.
///
/// `path` is the SQLite database file; the memory backend ignores it.
pub fn open_index(config: &KnowledgeBaseConfig, path: &Path) -> AppResult<Box<dyn VectorIndex>> {
    match config.index_backend {
        IndexBackend::Sqlite => Ok(Box::new(SqliteIndex::open(path)?)),
        IndexBackend::Memory => Ok(Box::new(MemoryIndex::new())),
    }
}

/// Cosine distance normalized to [0, 1].
///
/// Zero-norm, length-mismatched or non-finite vectors have cosine 0, so
/// distance 1. Sums are accumulated in f64 so large components do not
/// overflow.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| x as f64 * y as f64).sum();
    let norm_a: f64 = a.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|&x| x as f64 * x as f64).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let cosine = dot / (norm_a * norm_b);
    if !cosine.is_finite() {
        return 1.0;
    }

    (1.0 - cosine).clamp(0.0, 1.0) as f32
}

/// Fail unless `actual` matches the dimensionality fixed for the index.
pub(crate) fn check_dimensions(expected: Option<usize>, actual: usize, op: &str) -> AppResult<()> {
    match expected {
        Some(dim) if dim != actual => Err(AppError::Index(format!(
            "{} vector has {} dimensions, index holds {}",
            op, actual, dim
        ))),
        _ => Ok(()),
    }
}

/// Rank `candidates` (already filtered, in insertion order) against `query`.
pub(crate) fn rank<'a>(
    query: &[f32],
    candidates: impl Iterator<Item = &'a IndexEntry>,
    k: usize,
) -> Vec<SearchResult> {
    let mut scored: Vec<(f32, &IndexEntry)> = candidates
        .map(|entry| (cosine_distance(query, &entry.vector), entry))
        .collect();

    // Stable sort keeps insertion order for equal distances.
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.truncate(k);

    scored
        .into_iter()
        .map(|(distance, entry)| SearchResult {
            id: entry.id.clone(),
            text: entry.text.clone(),
            category: entry.category,
            metadata: entry.metadata.clone(),
            similarity: 1.0 - distance,
        })
        .collect()
}
