//! Prompt system for the PQRS assistant.
//!
//! This crate provides structured prompt management with:
//! - YAML prompt definitions, compiled in and overridable per workspace
//! - Handlebars template rendering
//! - Per-prompt sampling settings

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    builtin_prompt, list_prompts, load_prompt, CHAT_PROMPT_ID, CLASSIFY_PROMPT_ID,
    RESPOND_PROMPT_ID,
};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition};
