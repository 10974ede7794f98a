//! Configuration management for the PQRS assistant.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config files (.pqrs/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric, with all state stored in `.pqrs/`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the text-generation factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["ollama", "openai"];

/// Default knowledge collection name.
pub const DEFAULT_COLLECTION: &str = "pqrs_infraestructura";

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .pqrs/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Text-generation provider ("ollama" or "openai")
    pub provider: String,

    /// Text-generation model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for the text-generation provider
    pub api_key: Option<String>,

    /// Environment variable holding the API key (from config.yaml)
    pub api_key_env: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub json_logs: bool,

    /// Knowledge collection served by this process
    pub collection: String,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
    knowledge: Option<KnowledgeSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    collection: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: None,
            log_level: None,
            verbose: false,
            no_color: false,
            json_logs: false,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `PQRS_WORKSPACE`: Override workspace path
    /// - `PQRS_CONFIG`: Path to config file
    /// - `PQRS_PROVIDER`: Text-generation provider
    /// - `PQRS_MODEL`: Model identifier
    /// - `PQRS_ENDPOINT`: Provider endpoint
    /// - `PQRS_API_KEY`: API key
    /// - `PQRS_COLLECTION`: Knowledge collection
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use pqrs_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("PQRS_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("PQRS_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.pqrs_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("PQRS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("PQRS_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) = std::env::var("PQRS_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(collection) = std::env::var("PQRS_COLLECTION") {
            config.collection = collection;
        }

        config.api_key = std::env::var("PQRS_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.clone().apply_file(config_file))
    }

    fn apply_file(mut self, file: ConfigFile) -> Self {
        if let Some(path) = file.workspace.and_then(|ws| ws.path) {
            self.workspace = PathBuf::from(path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.json_logs = json;
            }
        }

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                self.provider = provider;
            }
            if let Some(model) = llm.model {
                self.model = model;
            }
            if llm.endpoint.is_some() {
                self.endpoint = llm.endpoint;
            }
            if llm.api_key_env.is_some() {
                self.api_key_env = llm.api_key_env;
            }
        }

        if let Some(collection) = file.knowledge.and_then(|k| k.collection) {
            self.collection = collection;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        collection: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(collection) = collection {
            self.collection = collection;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .pqrs directory.
    pub fn pqrs_dir(&self) -> PathBuf {
        self.workspace.join(".pqrs")
    }

    /// Ensure the .pqrs directory exists.
    pub fn ensure_pqrs_dir(&self) -> AppResult<()> {
        let pqrs_dir = self.pqrs_dir();
        if !pqrs_dir.exists() {
            std::fs::create_dir_all(&pqrs_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .pqrs directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Resolve the API key for the active provider.
    ///
    /// Order: `PQRS_API_KEY`, the `apiKeyEnv` variable from config.yaml,
    /// then `OPENAI_API_KEY` when the provider is OpenAI.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ref env_var) = self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Some(key);
            }
        }

        if self.provider.eq_ignore_ascii_case("openai") {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key().is_none() {
            return Err(AppError::Config(
                "OpenAI provider requires an API key (PQRS_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        if self.collection.trim().is_empty() {
            return Err(AppError::Config(
                "Collection name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.collection, DEFAULT_COLLECTION);
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_pqrs_dir() {
        let config = AppConfig::default();
        assert!(config.pqrs_dir().ends_with(".pqrs"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("openai".to_string()),
            Some("gpt-3.5-turbo".to_string()),
            Some("pruebas".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.model, "gpt-3.5-turbo");
        assert_eq!(overridden.collection, "pruebas");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            "llm:\n  provider: openai\n  model: gpt-4o-mini\n  apiKeyEnv: MY_KEY\n\
             logging:\n  level: warn\n  color: false\n  json: true\n\
             knowledge:\n  collection: manuales\n",
        )
        .unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key_env.as_deref(), Some("MY_KEY"));
        assert_eq!(config.log_level.as_deref(), Some("warn"));
        assert!(config.no_color);
        assert!(config.json_logs);
        assert_eq!(config.collection, "manuales");
    }

    #[test]
    fn test_merge_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [unclosed").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "unknown".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_openai_with_explicit_key() {
        let config = AppConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
