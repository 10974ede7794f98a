//! Command handlers for the PQRS Assistant CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod categories;
pub mod chat;
pub mod classify;
pub mod clear;
pub mod ingest;
pub mod respond;
pub mod search;
pub mod stats;

// Re-export command types for convenience
pub use categories::CategoriesCommand;
pub use chat::ChatCommand;
pub use classify::ClassifyCommand;
pub use clear::ClearCommand;
pub use ingest::IngestCommand;
pub use respond::RespondCommand;
pub use search::SearchCommand;
pub use stats::StatsCommand;

use pqrs_core::{config::AppConfig, AppResult};
use pqrs_knowledge::{open_pipeline, ComplaintResponder};
use pqrs_llm::LlmClient;
use std::sync::Arc;

/// Build the text-generation client for the configured provider.
pub(crate) fn llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    config.validate()?;
    let api_key = config.resolve_api_key();
    pqrs_llm::create_client(&config.provider, config.endpoint.as_deref(), api_key.as_deref())
}

/// Open the configured collection and wire a responder over it.
pub(crate) fn responder(config: &AppConfig) -> AppResult<ComplaintResponder> {
    let llm = llm_client(config)?;
    let (kb_config, pipeline) = open_pipeline(&config.workspace, &config.collection)?;

    Ok(
        ComplaintResponder::new(Arc::new(pipeline), llm, &config.model, &config.workspace)?
            .with_top_k(kb_config.top_k, kb_config.chat_top_k),
    )
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
