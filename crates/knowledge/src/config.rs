//! Knowledge base configuration management.

use crate::embeddings::EmbeddingConfig;
use crate::index::IndexBackend;
use pqrs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-collection settings stored in `.pqrs/knowledge/<collection>/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBaseConfig {
    /// Collection name
    #[serde(default)]
    pub name: String,

    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters re-read at the start of each following chunk
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Results retrieved per complaint
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Results retrieved per chat message
    #[serde(default = "default_chat_top_k")]
    pub chat_top_k: usize,

    #[serde(default)]
    pub index_backend: IndexBackend,

    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

fn default_chat_top_k() -> usize {
    3
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            chat_top_k: default_chat_top_k(),
            index_backend: IndexBackend::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl KnowledgeBaseConfig {
    /// Default settings for the named collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a collection's configuration.
    ///
    /// Loads from `.pqrs/knowledge/<collection>/config.yaml` if it exists,
    /// otherwise returns the defaults for that collection.
    pub fn load(workspace: &Path, collection: &str) -> AppResult<Self> {
        let config_path = get_config_path(workspace, collection);

        if !config_path.exists() {
            tracing::debug!(
                "Using default knowledge base config for '{}' (no config file found)",
                collection
            );
            return Ok(Self::new(collection));
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        // The directory name is authoritative.
        config.name = collection.to_string();

        tracing::debug!("Loaded knowledge base config for '{}'", collection);
        Ok(config)
    }

    /// Load the configuration, writing the defaults on first use.
    pub fn load_or_init(workspace: &Path, collection: &str) -> AppResult<Self> {
        let config = Self::load(workspace, collection)?;
        if !get_config_path(workspace, collection).exists() {
            config.save(workspace)?;
        }
        Ok(config)
    }

    /// Save the configuration under its collection directory.
    pub fn save(&self, workspace: &Path) -> AppResult<()> {
        let config_path = get_config_path(workspace, &self.name);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create config directory: {}", e))
            })?;
        }

        let yaml = serde_yaml::to_string(self)?;

        fs::write(&config_path, yaml).map_err(|e| {
            AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Saved knowledge base config for '{}'", self.name);
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        self.embedding.validate()
    }
}

/// Get the directory of a collection.
pub fn get_base_dir(workspace: &Path, collection: &str) -> PathBuf {
    workspace.join(".pqrs").join("knowledge").join(collection)
}

/// Get the path to a collection's config file.
pub fn get_config_path(workspace: &Path, collection: &str) -> PathBuf {
    get_base_dir(workspace, collection).join("config.yaml")
}

/// Get the SQLite index path for a collection.
pub fn get_index_path(workspace: &Path, collection: &str) -> PathBuf {
    get_base_dir(workspace, collection).join("index.sqlite")
}
