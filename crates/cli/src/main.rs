//! PQRS Assistant CLI
//!
//! Main entry point for the pqrs command-line tool.
//! Ingests reference documents and answers citizen complaints about public
//! infrastructure from the local knowledge base.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    CategoriesCommand, ChatCommand, ClassifyCommand, ClearCommand, IngestCommand,
    RespondCommand, SearchCommand, StatsCommand,
};
use pqrs_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use tracing::Instrument;

/// PQRS Assistant - answers infrastructure complaints from a local knowledge base
#[derive(Parser, Debug)]
#[command(name = "pqrs")]
#[command(about = "Answers infrastructure complaints from a local knowledge base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PQRS_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PQRS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// LLM provider (ollama, openai)
    #[arg(short, long, global = true, env = "PQRS_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "PQRS_MODEL")]
    model: Option<String>,

    /// Knowledge base collection
    #[arg(long, global = true, env = "PQRS_COLLECTION")]
    collection: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add documents to the knowledge base
    Ingest(IngestCommand),

    /// Search the knowledge base
    Search(SearchCommand),

    /// Answer a citizen complaint
    Respond(RespondCommand),

    /// Ask the assistant a free-form question
    Chat(ChatCommand),

    /// Classify a complaint into a category
    Classify(ClassifyCommand),

    /// List the complaint categories
    Categories(CategoriesCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),

    /// Remove every entry from the knowledge base
    Clear(ClearCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ingest(_) => "ingest",
            Commands::Search(_) => "search",
            Commands::Respond(_) => "respond",
            Commands::Chat(_) => "chat",
            Commands::Classify(_) => "classify",
            Commands::Categories(_) => "categories",
            Commands::Stats(_) => "stats",
            Commands::Clear(_) => "clear",
        }
    }

    async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match self {
            Commands::Ingest(cmd) => cmd.execute(config).await,
            Commands::Search(cmd) => cmd.execute(config).await,
            Commands::Respond(cmd) => cmd.execute(config).await,
            Commands::Chat(cmd) => cmd.execute(config).await,
            Commands::Classify(cmd) => cmd.execute(config).await,
            Commands::Categories(cmd) => cmd.execute(),
            Commands::Stats(cmd) => cmd.execute(config),
            Commands::Clear(cmd) => cmd.execute(config).await,
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, then config.yaml, then environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let mut config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.collection,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    config.json_logs |= cli.json_logs;

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.json_logs)?;

    tracing::info!("PQRS Assistant CLI starting");
    tracing::debug!(
        workspace = ?config.workspace,
        provider = %config.provider,
        model = %config.model,
        collection = %config.collection,
        "Resolved configuration"
    );

    config.ensure_pqrs_dir()?;

    let span = tracing::info_span!("command", name = cli.command.name());
    let result = cli.command.execute(&config).instrument(span).await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
