//! Ollama Embedding Provider
//!
//! Semantic embeddings via Ollama's local `/api/embed` endpoint, using models
//! such as `nomic-embed-text` or `all-minilm`.
//!
//! A whole batch is sent in one request. Failures are returned as-is; this
//! provider never retries.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use pqrs_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default Ollama API base URL
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBED_ENDPOINT: &str = "/api/embed";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider from configuration.
    ///
    /// The endpoint comes from the config, then `OLLAMA_URL`, then the
    /// local default. No connection is made until the first request.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size,
        })
    }

    fn check_dimensions(&self, embeddings: &[Vec<f32>]) -> AppResult<()> {
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(AppError::Embedding(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                bad.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }

        self.check_dimensions(&body.embeddings)?;

        debug!("Generated {} embeddings", body.embeddings.len());

        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, dimensions: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "all-minilm".to_string(),
            dimensions,
            batch_size: 8,
            endpoint: Some(server.uri()),
        }
    }

    #[tokio::test]
    async fn test_embed_batch_single_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({
                "model": "all-minilm",
                "input": ["hueco", "poste"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "all-minilm",
                "embeddings": [[0.1, 0.2, 0.3], [0.3, 0.2, 0.1]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        let embeddings = provider
            .embed_batch(&["hueco".to_string(), "poste".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![0.1, 0.2, 0.3], vec![0.3, 0.2, 0.1]]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"embeddings": [[0.1, 0.2]]})),
            )
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        let result = provider.embed("hueco").await;

        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model \"all-minilm\" not found"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        match provider.embed("hueco").await {
            Err(AppError::Embedding(msg)) => assert!(msg.contains("not found")),
            other => panic!("Expected embedding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).unwrap();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }
}
