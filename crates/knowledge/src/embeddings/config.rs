//! Embedding configuration for a knowledge base.

use pqrs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding settings stored under `embedding:` in the base config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Maximum texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider endpoint (Ollama base URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_provider() -> String {
    "trigram".to_string()
}

fn default_model() -> String {
    "trigram-v1".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimensions: default_dimensions(),
            batch_size: default_batch_size(),
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
