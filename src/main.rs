//! Price feed CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use pricefeed_config::load_config;
use pricefeed_monitor::setup_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    // Setup logging; CLI flags win over the config file
    let log_level = match cli.log_level {
        Some(cli::LogLevel::Trace) => "trace",
        Some(cli::LogLevel::Debug) => "debug",
        Some(cli::LogLevel::Info) => "info",
        Some(cli::LogLevel::Warn) => "warn",
        Some(cli::LogLevel::Error) => "error",
        None => config.logging.level.as_str(),
    };
    let _log_guard = setup_logging(
        log_level,
        cli.json_logs || config.logging.is_json(),
        config.logging.file.as_deref().map(Path::new),
    );

    // Execute command
    match cli.command {
        Commands::Price(args) => cli::commands::price::run(args, &config).await,
        Commands::Batch(args) => cli::commands::batch::run(args, &config).await,
        Commands::History(args) => cli::commands::history::run(args, &config).await,
        Commands::Watch(args) => cli::commands::watch::run(args, &config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, &config).await,
    }
}
