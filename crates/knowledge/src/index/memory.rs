//! In-process vector index.

use super::{check_dimensions, rank, VectorIndex};
use crate::types::{Category, IndexEntry, SearchResult};
use pqrs_core::AppResult;

/// Entries kept in insertion order; queries scan linearly.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    entries: Vec<IndexEntry>,
    dimensions: Option<usize>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for MemoryIndex {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn insert(&mut self, entry: IndexEntry) -> AppResult<()> {
        check_dimensions(self.dimensions, entry.vector.len(), "Insert")?;
        self.dimensions.get_or_insert(entry.vector.len());
        self.entries.push(entry);
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        category: Option<Category>,
    ) -> AppResult<Vec<SearchResult>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        check_dimensions(self.dimensions, vector.len(), "Query")?;

        let candidates = self
            .entries
            .iter()
            .filter(|e| category.map_or(true, |c| e.category == c));

        Ok(rank(vector, candidates, k))
    }

    fn clear(&mut self) -> AppResult<()> {
        self.entries.clear();
        self.dimensions = None;
        Ok(())
    }

    fn count(&self) -> AppResult<usize> {
        Ok(self.entries.len())
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use pqrs_core::AppError;

    fn entry(id: &str, category: Category, vector: Vec<f32>) -> IndexEntry {
        IndexEntry {
            id: id.to_string(),
            vector,
            text: id.to_string(),
            category,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let index = MemoryIndex::new();
        assert!(index.query(&[1.0, 0.0], 5, None).unwrap().is_empty());
        assert_eq!(index.count().unwrap(), 0);
        assert_eq!(index.dimensions(), None);
    }

    #[test]
    fn test_category_filter() {
        let mut index = MemoryIndex::new();
        index
            .insert(entry("via", Category::RoadsAndPavements, vec![1.0, 0.0]))
            .unwrap();
        index
            .insert(entry("luz", Category::PublicLighting, vec![1.0, 0.0]))
            .unwrap();

        let results = index
            .query(&[1.0, 0.0], 10, Some(Category::PublicLighting))
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "luz");
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut index = MemoryIndex::new();
        index.insert(entry("doc_0", Category::Other, vec![1.0, 0.0])).unwrap();
        index.insert(entry("doc_0", Category::Other, vec![0.0, 1.0])).unwrap();

        assert_eq!(index.count().unwrap(), 2);
        assert_eq!(index.query(&[1.0, 1.0], 5, None).unwrap().len(), 2);
    }

    #[test]
    fn test_dimension_fixed_until_clear() {
        let mut index = MemoryIndex::new();
        index.insert(entry("a", Category::Other, vec![1.0, 0.0])).unwrap();

        let wrong = index.insert(entry("b", Category::Other, vec![1.0, 0.0, 0.0]));
        assert!(matches!(wrong, Err(AppError::Index(_))));
        assert!(matches!(
            index.query(&[1.0], 1, None),
            Err(AppError::Index(_))
        ));

        index.clear().unwrap();
        index
            .insert(entry("b", Category::Other, vec![1.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(index.dimensions(), Some(3));
    }

    #[test]
    fn test_k_larger_than_index() {
        let mut index = MemoryIndex::new();
        index.insert(entry("a", Category::Other, vec![1.0, 0.0])).unwrap();

        assert_eq!(index.query(&[1.0, 0.0], 10, None).unwrap().len(), 1);
        assert!(index.query(&[1.0, 0.0], 0, None).unwrap().is_empty());
    }
}
