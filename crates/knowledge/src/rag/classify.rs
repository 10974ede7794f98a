//! Complaint classification into the closed category set.

use crate::types::Category;
use async_trait::async_trait;
use pqrs_core::{AppError, AppResult};
use pqrs_llm::{LlmClient, LlmRequest};
use pqrs_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;
use std::sync::Arc;

/// Produces a raw category label for a complaint.
///
/// Output is not trusted: `classify_category` maps anything outside the
/// known labels to `Category::Other`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, title: &str, description: &str) -> AppResult<String>;
}

/// Classifier backed by a text-generation model.
pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
        }
    }
}

/// "- label: description" lines for every category.
pub fn category_listing() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("- {}: {}", c.label(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, title: &str, description: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("title".to_string(), title.to_string());
        variables.insert("description".to_string(), description.to_string());
        variables.insert("categories".to_string(), category_listing());

        let built = build_prompt(&self.prompt, variables)?;
        let request = LlmRequest::new(built.user, &self.model)
            .with_max_tokens(built.behavior.max_tokens)
            .with_temperature(built.behavior.temperature);

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| AppError::Llm(format!("Classification failed: {}", e)))?;

        Ok(response.content)
    }
}

/// Classify a complaint, falling back to `Category::Other` on unknown output
/// or any classifier failure.
pub async fn classify_category(
    classifier: &dyn Classifier,
    title: &str,
    description: &str,
) -> Category {
    match classifier.classify(title, description).await {
        Ok(raw) => {
            let category = Category::from_label(&raw);
            tracing::debug!(raw = %raw.trim(), category = %category, "Classified complaint");
            category
        }
        Err(e) => {
            tracing::warn!(error = %e, "Classification failed, using default category");
            Category::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::ScriptedLlm;
    use pqrs_prompt::{builtin_prompt, CLASSIFY_PROMPT_ID};

    fn classifier(llm: Arc<ScriptedLlm>) -> LlmClassifier {
        LlmClassifier::new(llm, "llama3.2", builtin_prompt(CLASSIFY_PROMPT_ID).unwrap())
    }

    #[tokio::test]
    async fn test_known_label_is_accepted() {
        let llm = Arc::new(ScriptedLlm::replying(" Alumbrado_Publico \n"));
        let category =
            classify_category(&classifier(llm.clone()), "Poste apagado", "Sin luz en la calle")
                .await;

        assert_eq!(category, Category::PublicLighting);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, Some(50));
        assert_eq!(requests[0].temperature, Some(0.1));
        assert!(requests[0].prompt.contains("Poste apagado"));
        assert!(requests[0].prompt.contains("- senalizacion: "));
    }

    #[tokio::test]
    async fn test_unknown_label_falls_back() {
        let llm = Arc::new(ScriptedLlm::replying("Categoría: alumbrado"));
        let category = classify_category(&classifier(llm), "Poste", "Sin luz en la calle").await;

        assert_eq!(category, Category::Other);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let llm = Arc::new(ScriptedLlm::failing());
        let category = classify_category(&classifier(llm), "Poste", "Sin luz en la calle").await;

        assert_eq!(category, Category::Other);
    }

    #[test]
    fn test_category_listing_has_every_label() {
        let listing = category_listing();
        assert_eq!(listing.lines().count(), Category::ALL.len());
        assert!(listing.starts_with("- vias_pavimentos: "));
    }
}
