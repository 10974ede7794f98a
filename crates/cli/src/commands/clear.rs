//! Clear command handler.

use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::open_pipeline;
use std::io::{self, BufRead, Write};

/// Remove every entry from the knowledge base
#[derive(Args, Debug)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ClearCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing clear command");

        let (_, pipeline) = open_pipeline(&config.workspace, &config.collection)?;
        let count = pipeline.count()?;

        if !self.yes && !confirm(&config.collection, count)? {
            println!("Aborted.");
            return Ok(());
        }

        pipeline.try_clear().await?;
        println!("Removed {} entries from '{}'", count, config.collection);

        Ok(())
    }
}

fn confirm(collection: &str, count: usize) -> AppResult<bool> {
    print!("Remove all {} entries from '{}'? [y/N] ", count, collection);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}
