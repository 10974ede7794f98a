//! Tests for ranking correctness across index backends.

use crate::index::{MemoryIndex, SqliteIndex, VectorIndex};
use crate::types::{Category, IndexEntry, Metadata};

/// Helper to create an entry with a normalized embedding.
fn create_entry(id: &str, category: Category, raw: &[f32]) -> IndexEntry {
    let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mut metadata = Metadata::new();
    metadata.insert("title".to_string(), id.into());

    IndexEntry {
        id: id.to_string(),
        vector: raw.iter().map(|x| x / norm).collect(),
        text: format!("Contenido de {}", id),
        category,
        metadata,
    }
}

fn backends() -> Vec<Box<dyn VectorIndex>> {
    vec![
        Box::new(MemoryIndex::new()),
        Box::new(SqliteIndex::open_in_memory().unwrap()),
    ]
}

#[test]
fn test_results_strictly_descending() {
    for mut index in backends() {
        // Inserted out of rank order on purpose.
        index
            .insert(create_entry("lejano", Category::Other, &[0.0, 1.0, 0.0]))
            .unwrap();
        index
            .insert(create_entry("exacto", Category::Other, &[1.0, 0.0, 0.0]))
            .unwrap();
        index
            .insert(create_entry("cercano", Category::Other, &[1.0, 0.5, 0.0]))
            .unwrap();
        index
            .insert(create_entry("medio", Category::Other, &[1.0, 1.5, 0.0]))
            .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 10, None).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(
            ids,
            vec!["exacto", "cercano", "medio", "lejano"],
            "backend {}",
            index.backend_name()
        );
        for pair in results.windows(2) {
            assert!(pair[0].similarity > pair[1].similarity);
        }
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
        assert!(results[3].similarity.abs() < 1e-5);
    }
}

#[test]
fn test_top_k_bounds_result_count() {
    for mut index in backends() {
        for i in 0..5 {
            index
                .insert(create_entry(
                    &format!("doc_{}", i),
                    Category::RoadsAndPavements,
                    &[1.0, i as f32, 0.5],
                ))
                .unwrap();
        }

        assert_eq!(index.query(&[1.0, 0.0, 0.0], 3, None).unwrap().len(), 3);
        assert_eq!(index.query(&[1.0, 0.0, 0.0], 50, None).unwrap().len(), 5);
        assert!(index
            .query(&[1.0, 0.0, 0.0], 5, Some(Category::PublicLighting))
            .unwrap()
            .is_empty());
    }
}

#[test]
fn test_filter_applies_before_truncation() {
    for mut index in backends() {
        // Three close roads entries outrank the single lighting entry.
        for i in 0..3 {
            index
                .insert(create_entry(
                    &format!("via_{}", i),
                    Category::RoadsAndPavements,
                    &[1.0, 0.1 * i as f32],
                ))
                .unwrap();
        }
        index
            .insert(create_entry("luz", Category::PublicLighting, &[0.0, 1.0]))
            .unwrap();

        let results = index
            .query(&[1.0, 0.0], 1, Some(Category::PublicLighting))
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "luz");
    }
}
