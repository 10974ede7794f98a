//! Ingest command handler.
//!
//! Loads files or a seed manifest and adds them to the knowledge base.

use super::print_json;
use clap::Args;
use pqrs_core::{config::AppConfig, AppError, AppResult};
use pqrs_knowledge::{loader, open_pipeline, Category, Document, Metadata};
use std::path::PathBuf;
use std::time::Instant;

/// Add documents to the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest
    pub paths: Vec<PathBuf>,

    /// YAML or JSON manifest listing documents
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Document title (single file only; defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Category assigned to ingested files
    #[arg(long, default_value = "otros")]
    pub category: Category,

    /// Clear the collection before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing ingest command");

        let documents = self.collect_documents()?;
        if documents.is_empty() {
            return Err(AppError::Validation(
                "Nothing to ingest: pass file paths or --manifest".to_string(),
            ));
        }

        let start = Instant::now();
        let (_, pipeline) = open_pipeline(&config.workspace, &config.collection)?;

        if self.reset {
            pipeline.try_clear().await?;
            tracing::info!(collection = %config.collection, "Collection reset");
        }

        let mut chunks = 0;
        let mut failed = Vec::new();
        for doc in &documents {
            match pipeline.try_add_document(doc).await {
                Ok(n) => chunks += n,
                Err(e) => {
                    tracing::warn!(title = %doc.title, error = %e, "Skipping document");
                    failed.push(doc.title.clone());
                }
            }
        }

        let added = documents.len() - failed.len();
        let elapsed = start.elapsed().as_secs_f64();

        if self.json {
            print_json(&serde_json::json!({
                "collection": config.collection,
                "documentsAdded": added,
                "chunksAdded": chunks,
                "failed": failed,
                "totalEntries": pipeline.count()?,
                "durationSecs": elapsed,
            }))?;
        } else {
            println!(
                "Ingested {} documents ({} chunks) into '{}' in {:.2}s",
                added, chunks, config.collection, elapsed
            );
            for title in &failed {
                println!("  failed: {}", title);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(AppError::Knowledge(format!(
                "{} of {} documents could not be ingested",
                failed.len(),
                documents.len()
            )))
        }
    }

    fn collect_documents(&self) -> AppResult<Vec<Document>> {
        let mut documents = match &self.manifest {
            Some(manifest) => loader::load_manifest(manifest)?,
            None => Vec::new(),
        };

        let files = loader::collect_files(&self.paths);
        let title = match (&self.title, files.len()) {
            (Some(title), 1) => Some(title.as_str()),
            (Some(_), n) => {
                tracing::warn!(files = n, "--title ignored when ingesting several files");
                None
            }
            (None, _) => None,
        };

        for file in &files {
            documents.push(loader::load_file(file, title, self.category, Metadata::new())?);
        }

        Ok(documents)
    }
}
