//! Complaint answering: classify, retrieve, compose and generate.

use crate::pipeline::RetrievalPipeline;
use crate::rag::classify::{classify_category, Classifier, LlmClassifier};
use crate::rag::context::compose_context;
use crate::rag::recommendations;
use crate::scoring::confidence;
use crate::types::{Category, ComplaintRequest, ComplaintResponse};
use chrono::Utc;
use pqrs_core::{AppError, AppResult};
use pqrs_llm::{LlmClient, LlmRequest};
use pqrs_prompt::{
    build_prompt, load_prompt, PromptDefinition, CHAT_PROMPT_ID, CLASSIFY_PROMPT_ID,
    RESPOND_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const FALLBACK_MESSAGE: &str = "Lo sentimos, hubo un error procesando su solicitud. \
     Por favor contacte directamente a la Secretaría de Infraestructura.";

const FALLBACK_RECOMMENDATION: &str = "Contactar directamente a la Secretaría de Infraestructura";

const CHAT_APOLOGY: &str = "Lo siento, no puedo procesar tu consulta en este momento. \
     Por favor contacta directamente a la Secretaría de Infraestructura.";

/// Default number of results retrieved per complaint.
pub const DEFAULT_TOP_K: usize = 5;

/// Default number of results retrieved per chat message.
pub const DEFAULT_CHAT_TOP_K: usize = 3;

/// Answers citizen complaints and questions from the knowledge base.
pub struct ComplaintResponder {
    pipeline: Arc<RetrievalPipeline>,
    llm: Arc<dyn LlmClient>,
    classifier: Arc<dyn Classifier>,
    model: String,
    respond_prompt: PromptDefinition,
    chat_prompt: PromptDefinition,
    top_k: usize,
    chat_top_k: usize,
}

impl ComplaintResponder {
    /// Create a responder using the workspace's prompts (or the built-ins).
    pub fn new(
        pipeline: Arc<RetrievalPipeline>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        workspace: &Path,
    ) -> AppResult<Self> {
        let model = model.into();
        let classifier = LlmClassifier::new(
            Arc::clone(&llm),
            model.clone(),
            load_prompt(workspace, CLASSIFY_PROMPT_ID)?,
        );

        Ok(Self {
            pipeline,
            llm,
            classifier: Arc::new(classifier),
            model,
            respond_prompt: load_prompt(workspace, RESPOND_PROMPT_ID)?,
            chat_prompt: load_prompt(workspace, CHAT_PROMPT_ID)?,
            top_k: DEFAULT_TOP_K,
            chat_top_k: DEFAULT_CHAT_TOP_K,
        })
    }

    /// Replace the classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set how many results complaints and chat messages retrieve.
    pub fn with_top_k(mut self, top_k: usize, chat_top_k: usize) -> Self {
        self.top_k = top_k;
        self.chat_top_k = chat_top_k;
        self
    }

    /// The citizen's category, or the classified one.
    pub async fn detect_category(&self, request: &ComplaintRequest) -> Category {
        match request.category {
            Some(category) => category,
            None => {
                classify_category(self.classifier.as_ref(), &request.title, &request.description)
                    .await
            }
        }
    }

    /// Answer a complaint; any failure is returned as an error.
    ///
    /// Retrieval failures are not errors: they yield no evidence and a
    /// confidence of 0.0.
    pub async fn try_respond(&self, request: &ComplaintRequest) -> AppResult<ComplaintResponse> {
        let start = Instant::now();
        request.validate()?;

        let category = self.detect_category(request).await;

        let query = format!("{} {}", request.title, request.description);
        let results = self.pipeline.search(&query, self.top_k, Some(category)).await;
        let retrieved = compose_context(&results);

        let mut variables = HashMap::new();
        let kind = request.complaint_type.display_name();
        variables.insert("kind".to_string(), kind.to_string());
        variables.insert("kind_upper".to_string(), kind.to_uppercase());
        variables.insert("category".to_string(), category.display_name());
        variables.insert("title".to_string(), request.title.clone());
        variables.insert("description".to_string(), request.description.clone());
        variables.insert(
            "location".to_string(),
            request
                .location
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "No especificada".to_string()),
        );
        variables.insert("citizen".to_string(), request.citizen_name.clone());
        variables.insert("context".to_string(), retrieved.context);

        let response = self.generate(&self.respond_prompt, variables).await?;

        tracing::info!(
            category = %category,
            references = results.len(),
            "Generated complaint response"
        );

        Ok(ComplaintResponse {
            complaint_id: format!("PQRS_{}", Utc::now().timestamp()),
            response,
            reference_documents: retrieved.reference_documents,
            confidence: confidence(&results),
            detected_category: category,
            elapsed_secs: start.elapsed().as_secs_f64(),
            recommendations: recommendations::for_category(category),
        })
    }

    /// Answer a complaint, replacing any failure with a generic apology.
    pub async fn respond(&self, request: &ComplaintRequest) -> ComplaintResponse {
        let start = Instant::now();

        match self.try_respond(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(title = %request.title, error = %e, "Failed to answer complaint");
                ComplaintResponse {
                    complaint_id: format!("PQRS_ERROR_{}", Utc::now().timestamp()),
                    response: FALLBACK_MESSAGE.to_string(),
                    reference_documents: Vec::new(),
                    confidence: 0.0,
                    detected_category: Category::Other,
                    elapsed_secs: start.elapsed().as_secs_f64(),
                    recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
                }
            }
        }
    }

    /// Answer a free-form question over the whole collection.
    pub async fn try_chat(&self, message: &str, extra_context: Option<&str>) -> AppResult<String> {
        let results = self.pipeline.search(message, self.chat_top_k, None).await;
        let retrieved = compose_context(&results);

        let mut variables = HashMap::new();
        variables.insert("message".to_string(), message.to_string());
        variables.insert(
            "extra_context".to_string(),
            extra_context
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("No disponible")
                .to_string(),
        );
        variables.insert("context".to_string(), retrieved.context);

        self.generate(&self.chat_prompt, variables).await
    }

    /// Answer a question, replacing any failure with a fixed apology.
    pub async fn chat(&self, message: &str, extra_context: Option<&str>) -> String {
        match self.try_chat(message, extra_context).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "Failed to answer chat message");
                CHAT_APOLOGY.to_string()
            }
        }
    }

    async fn generate(
        &self,
        definition: &PromptDefinition,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let built = build_prompt(definition, variables)?;

        let request = LlmRequest::new(built.user, &self.model)
            .with_max_tokens(built.behavior.max_tokens)
            .with_temperature(built.behavior.temperature);

        tracing::debug!(
            prompt = %definition.id,
            provider = self.llm.provider_name(),
            "Requesting completion"
        );

        let response = self.llm.complete(&request).await?;
        let content = response.content.trim();

        if content.is_empty() {
            return Err(AppError::Llm("Model returned an empty answer".to_string()));
        }

        Ok(content.to_string())
    }
}
