//! Turning ranked search results into generation context.

use crate::types::SearchResult;
use serde::{Deserialize, Serialize};

/// Evidence handed to the response prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// One title per result in ranked order; repeats are kept
    pub reference_documents: Vec<String>,

    /// `Documento:`/`Contenido:` blocks separated by blank lines
    pub context: String,
}

pub fn compose_context(results: &[SearchResult]) -> RetrievedContext {
    let reference_documents = results.iter().map(|r| r.title().to_string()).collect();

    let context = results
        .iter()
        .map(|r| format!("Documento: {}\nContenido: {}", r.title(), r.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    RetrievedContext {
        reference_documents,
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Metadata};

    fn result(title: &str, text: &str) -> SearchResult {
        let mut metadata = Metadata::new();
        metadata.insert("title".to_string(), title.into());
        SearchResult {
            id: format!("{}_0", title),
            text: text.to_string(),
            category: Category::Other,
            metadata,
            similarity: 0.8,
        }
    }

    #[test]
    fn test_titles_are_not_deduplicated() {
        let results = vec![
            result("Guía de Huecos", "Línea 123"),
            result("Guía de Huecos", "72 horas"),
            result("Manual", "Procedimiento"),
        ];

        let ctx = compose_context(&results);

        assert_eq!(
            ctx.reference_documents,
            vec!["Guía de Huecos", "Guía de Huecos", "Manual"]
        );
        assert_eq!(
            ctx.context,
            "Documento: Guía de Huecos\nContenido: Línea 123\n\n\
             Documento: Guía de Huecos\nContenido: 72 horas\n\n\
             Documento: Manual\nContenido: Procedimiento"
        );
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(compose_context(&[]), RetrievedContext::default());
    }
}
