//! SQLite-backed vector index.

use super::{check_dimensions, rank, VectorIndex};
use crate::types::{Category, IndexEntry, Metadata, SearchResult};
use pqrs_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL,
    category TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_entries_category ON entries(category);
"#;

/// Persistent index in a single SQLite file.
///
/// Vectors are stored as little-endian f32 blobs and ranked in process.
/// `seq` records insertion order for tie-breaking.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    dimensions: Option<usize>,
}

type RawRow = (String, String, String, Vec<u8>, String);

impl SqliteIndex {
    /// Open (or create) the index at `path`.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Index(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;

        let index = Self::from_connection(conn)?;
        tracing::debug!(
            "Opened SQLite index at {:?} (dimensions: {:?})",
            path,
            index.dimensions
        );
        Ok(index)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Index(format!("Failed to open SQLite index: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

        let first: Option<Vec<u8>> = conn
            .query_row(
                "SELECT embedding FROM entries ORDER BY seq LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::Index(format!("Failed to read index dimensions: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            dimensions: first.map(|bytes| bytes.len() / 4),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Index("SQLite connection lock poisoned".to_string()))
    }

    fn load(&self, category: Option<Category>) -> AppResult<Vec<IndexEntry>> {
        let conn = self.lock()?;

        let (sql, label) = match category {
            Some(c) => (
                "SELECT id, category, text, embedding, metadata FROM entries \
                 WHERE category = ?1 ORDER BY seq",
                Some(c.label()),
            ),
            None => (
                "SELECT id, category, text, embedding, metadata FROM entries ORDER BY seq",
                None,
            ),
        };

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Index(format!("Failed to prepare query: {}", e)))?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawRow> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        };

        let rows = match label {
            Some(label) => stmt.query_map(params![label], map_row),
            None => stmt.query_map([], map_row),
        }
        .map_err(|e| AppError::Index(format!("Failed to query entries: {}", e)))?;

        let mut entries = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| AppError::Index(format!("Failed to read entry: {}", e)))?;
            entries.push(decode_row(raw)?);
        }

        Ok(entries)
    }
}

impl VectorIndex for SqliteIndex {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    fn insert(&mut self, entry: IndexEntry) -> AppResult<()> {
        check_dimensions(self.dimensions, entry.vector.len(), "Insert")?;

        let metadata_json = serde_json::to_string(&entry.metadata)
            .map_err(|e| AppError::Index(format!("Failed to serialize metadata: {}", e)))?;

        self.lock()?
            .execute(
                "INSERT INTO entries (id, category, text, embedding, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    entry.id,
                    entry.category.label(),
                    entry.text,
                    embedding_to_bytes(&entry.vector),
                    metadata_json,
                ],
            )
            .map_err(|e| AppError::Index(format!("Failed to insert entry '{}': {}", entry.id, e)))?;

        self.dimensions.get_or_insert(entry.vector.len());
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        category: Option<Category>,
    ) -> AppResult<Vec<SearchResult>> {
        if self.dimensions.is_none() || k == 0 {
            return Ok(Vec::new());
        }
        check_dimensions(self.dimensions, vector.len(), "Query")?;

        let entries = self.load(category)?;
        let results = rank(vector, entries.iter(), k);

        tracing::debug!(
            "Ranked {} entries, returning {} (requested top-{})",
            entries.len(),
            results.len(),
            k
        );

        Ok(results)
    }

    fn clear(&mut self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM entries", [])
            .map_err(|e| AppError::Index(format!("Failed to delete entries: {}", e)))?;

        self.dimensions = None;
        tracing::info!("Cleared SQLite index");
        Ok(())
    }

    fn count(&self) -> AppResult<usize> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM entries", [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n as usize)
            .map_err(|e| AppError::Index(format!("Failed to count entries: {}", e)))
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

fn decode_row((id, category, text, embedding, metadata): RawRow) -> AppResult<IndexEntry> {
    let category = Category::parse(&category).ok_or_else(|| {
        AppError::Index(format!("Entry '{}' has unknown category '{}'", id, category))
    })?;

    let metadata: Metadata = serde_json::from_str(&metadata)
        .map_err(|e| AppError::Index(format!("Entry '{}' has invalid metadata: {}", id, e)))?;

    Ok(IndexEntry {
        vector: bytes_to_embedding(&embedding)?,
        id,
        text,
        category,
        metadata,
    })
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str, category: Category, vector: Vec<f32>) -> IndexEntry {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), serde_json::json!(id));
        IndexEntry {
            id: id.to_string(),
            vector,
            text: format!("texto de {}", id),
            category,
            metadata,
        }
    }

    #[test]
    fn test_open_creates_schema() {
        let temp = TempDir::new().unwrap();
        let index = SqliteIndex::open(&temp.path().join("kb").join("index.sqlite")).unwrap();

        assert_eq!(index.count().unwrap(), 0);
        assert_eq!(index.dimensions(), None);
        assert!(index.query(&[1.0, 0.0], 3, None).unwrap().is_empty());
    }

    #[test]
    fn test_insert_and_query() {
        let mut index = SqliteIndex::open_in_memory().unwrap();
        index
            .insert(entry("Manual_0", Category::RoadsAndPavements, vec![1.0, 0.0, 0.0]))
            .unwrap();
        index
            .insert(entry("Manual_1", Category::RoadsAndPavements, vec![0.0, 1.0, 0.0]))
            .unwrap();

        let results = index.query(&[1.0, 0.1, 0.0], 5, None).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "Manual_0");
        assert_eq!(results[0].text, "texto de Manual_0");
        assert_eq!(results[0].title(), "Manual_0");
        assert_eq!(results[0].category, Category::RoadsAndPavements);
    }

    #[test]
    fn test_category_filter_uses_column() {
        let mut index = SqliteIndex::open_in_memory().unwrap();

        let mut spoofed = entry("Luz_0", Category::PublicLighting, vec![1.0, 0.0]);
        spoofed
            .metadata
            .insert("category".to_string(), serde_json::json!("vias_pavimentos"));
        index.insert(spoofed).unwrap();
        index
            .insert(entry("Via_0", Category::RoadsAndPavements, vec![1.0, 0.0]))
            .unwrap();

        let results = index
            .query(&[1.0, 0.0], 5, Some(Category::RoadsAndPavements))
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "Via_0");
    }

    #[test]
    fn test_persistence_and_dimension_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.sqlite");

        {
            let mut index = SqliteIndex::open(&path).unwrap();
            index
                .insert(entry("Guía_0", Category::Other, vec![0.5, 0.5, 0.0, 0.0]))
                .unwrap();
        }

        let index = SqliteIndex::open(&path).unwrap();
        assert_eq!(index.count().unwrap(), 1);
        assert_eq!(index.dimensions(), Some(4));
        assert!(matches!(
            index.query(&[1.0, 0.0], 1, None),
            Err(AppError::Index(_))
        ));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = SqliteIndex::open_in_memory().unwrap();
        for id in ["c", "a", "b"] {
            index.insert(entry(id, Category::Other, vec![1.0, 1.0])).unwrap();
        }

        let ids: Vec<String> = index
            .query(&[1.0, 1.0], 3, None)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();

        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_clear_twice() {
        let mut index = SqliteIndex::open_in_memory().unwrap();
        index.insert(entry("x", Category::Other, vec![1.0])).unwrap();

        index.clear().unwrap();
        assert_eq!(index.count().unwrap(), 0);
        index.clear().unwrap();
        assert_eq!(index.count().unwrap(), 0);
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let vector = vec![0.25, -1.5, 3.0];
        assert_eq!(bytes_to_embedding(&embedding_to_bytes(&vector)).unwrap(), vector);
        assert!(bytes_to_embedding(&[0, 1, 2]).is_err());
    }
}
