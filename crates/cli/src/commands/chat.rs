//! Chat command handler.

use super::responder;
use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};

/// Ask the assistant a free-form question
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Question for the assistant
    pub message: String,

    /// Extra context to pass along with the question
    #[arg(long)]
    pub context: Option<String>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(collection = %config.collection, "Executing chat command");

        let responder = responder(config)?;
        let answer = responder.chat(&self.message, self.context.as_deref()).await;

        println!("{}", answer);
        Ok(())
    }
}
