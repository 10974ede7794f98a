//! Search command handler.

use super::print_json;
use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::{confidence, open_pipeline, Category};

const SNIPPET_CHARS: usize = 160;

/// Search the knowledge base
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Number of results to retrieve (defaults to the collection's top_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Only return entries of this category
    #[arg(long)]
    pub category: Option<Category>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing search command");

        let (kb_config, pipeline) = open_pipeline(&config.workspace, &config.collection)?;
        let k = self.top_k.unwrap_or(kb_config.top_k);

        let results = pipeline.try_search(&self.query, k, self.category).await?;
        let score = confidence(&results);

        if self.json {
            print_json(&serde_json::json!({
                "query": self.query,
                "confidence": score,
                "results": results,
            }))?;
            return Ok(());
        }

        if results.is_empty() {
            println!("No results.");
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            println!(
                "{}. [{:.3}] {} ({})",
                rank + 1,
                result.similarity,
                result.title(),
                result.category
            );
            println!("   {}", snippet(&result.text));
        }
        println!();
        println!("Confidence: {:.2}", score);

        Ok(())
    }
}

fn snippet(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut)
}
