//! Stats command handler.
//!
//! Doubles as the health check: index failures are reported as an `error`
//! status instead of failing the command.

use super::print_json;
use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::{open_pipeline, CollectionStats, CollectionStatus};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing stats command");

        let stats = collection_stats(config);

        if self.json {
            return print_json(&serde_json::json!({
                "collection": config.collection,
                "totalEntries": stats.total_entries,
                "status": stats.status,
            }));
        }

        println!("Knowledge base: {}", config.collection);
        println!("  Entries: {}", stats.total_entries);
        println!("  Status: {}", status_label(stats.status));

        Ok(())
    }
}

fn collection_stats(config: &AppConfig) -> CollectionStats {
    match open_pipeline(&config.workspace, &config.collection) {
        Ok((_, pipeline)) => pipeline.stats(),
        Err(e) => {
            tracing::error!(collection = %config.collection, error = %e, "Failed to open knowledge base");
            CollectionStats {
                total_entries: 0,
                status: CollectionStatus::Error,
            }
        }
    }
}

fn status_label(status: CollectionStatus) -> &'static str {
    match status {
        CollectionStatus::Active => "active",
        CollectionStatus::Empty => "empty",
        CollectionStatus::Error => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(workspace: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.workspace = workspace.to_path_buf();
        config
    }

    #[test]
    fn test_fresh_collection_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();

        let stats = collection_stats(&config_for(temp.path()));

        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.status, CollectionStatus::Empty);
    }

    #[test]
    fn test_broken_collection_reports_error_status() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config_for(temp.path());
        let kb_dir = temp.path().join(".pqrs/knowledge").join(&config.collection);
        fs::create_dir_all(&kb_dir).unwrap();
        fs::write(kb_dir.join("config.yaml"), "chunk_size: [not, a, number]").unwrap();

        let stats = collection_stats(&config);

        assert_eq!(stats.status, CollectionStatus::Error);
        assert!(StatsCommand { json: true }.execute(&config).is_ok());
    }
}
