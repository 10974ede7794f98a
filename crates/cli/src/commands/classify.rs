//! Classify command handler.

use super::llm_client;
use clap::Args;
use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::rag::{classify_category, LlmClassifier};
use pqrs_prompt::{load_prompt, CLASSIFY_PROMPT_ID};

/// Classify a complaint into a category
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// Complaint title
    pub title: String,

    /// Complaint description
    pub description: String,
}

impl ClassifyCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing classify command");

        let classifier = LlmClassifier::new(
            llm_client(config)?,
            &config.model,
            load_prompt(&config.workspace, CLASSIFY_PROMPT_ID)?,
        );

        let category = classify_category(&classifier, &self.title, &self.description).await;

        println!("{}", category);
        Ok(())
    }
}
