//! Council CLI
//!
//! Entry point for the `council` command-line tool: ask questions about
//! council records and search them directly.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{AskCommand, SearchCommand};
use council_core::config::{AppConfig, ConfigOverrides};
use council_core::logging;
use std::path::PathBuf;

/// Research assistant for municipal council records
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(about = "Ask questions about municipal council records", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COUNCIL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COUNCIL_CONFIG")]
    config: Option<PathBuf>,

    /// Council records snapshot (JSON)
    #[arg(short, long, global = true, env = "COUNCIL_DATA")]
    data: Option<PathBuf>,

    /// Reasoning provider (ollama, openai)
    #[arg(short, long, global = true, env = "COUNCIL_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "COUNCIL_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question and stream the researched answer
    Ask(AskCommand),

    /// Search council records without the reasoning loop
    Search(SearchCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(ConfigOverrides {
        workspace: cli.workspace,
        config_file: cli.config,
        data_path: cli.data,
        provider: cli.provider,
        model: cli.model,
        log_level: cli.log_level,
        log_json: cli.log_format == LogFormat::Json,
        verbose: cli.verbose,
        no_color: cli.no_color,
        max_steps: None,
    });

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    tracing::info!("Council CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {:#}", e),
    }

    result
}
