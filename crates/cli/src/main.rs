//! seedbed CLI
//!
//! Provisions a local database: downloads the seed SQL file if it is
//! missing, then brings the database service up with container
//! orchestration. Running `seedbed` with no arguments does exactly that.

mod commands;

use clap::{Parser, Subcommand};
use commands::{InitCommand, StatusCommand, UpCommand};
use seedbed_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// seedbed - seed a local database and start it
#[derive(Parser, Debug)]
#[command(name = "seedbed")]
#[command(about = "Download a seed SQL dump if missing, then start the database service", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SEEDBED_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: .seedbed/config.yaml)
    #[arg(short, long, global = true, env = "SEEDBED_CONFIG")]
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

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ensure the seed file exists, then start the service (default)
    Up(UpCommand),

    /// Show seed, init scripts and compose file state
    Status(StatusCommand),

    /// Generate a compose file for the database
    Init(InitCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Up(_) => "up",
            Commands::Status(_) => "status",
            Commands::Init(_) => "init",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("seedbed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("seedbed starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Seed: {:?} <- {}", config.seed_path(), config.seed.url);
    tracing::debug!("Compose file: {:?}", config.compose_file_path());

    let command = cli.command.unwrap_or_else(|| Commands::Up(UpCommand::default()));
    let _span = tracing::info_span!("command", name = command.name()).entered();

    let result = match command {
        Commands::Up(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Init(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(kind = e.kind(), "Command failed: {}", e),
    }

    result
}
