//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::watch::AlertDefinition;

#[derive(Parser)]
#[command(name = "pricefeed")]
#[command(author, version, about = "Cached price lookups and threshold alerts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the current price of one symbol
    Price(PriceArgs),
    /// Fetch current prices for several symbols
    Batch(BatchArgs),
    /// Fetch daily price history
    History(HistoryArgs),
    /// Evaluate price alerts until interrupted
    Watch(WatchArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct PriceArgs {
    /// Symbol to look up
    pub symbol: String,
}

#[derive(clap::Args)]
pub struct BatchArgs {
    /// Symbols to look up (comma-separated)
    #[arg(short = 'S', long, value_delimiter = ',', required = true)]
    pub symbols: Vec<String>,
}

#[derive(clap::Args)]
pub struct HistoryArgs {
    /// Symbol to look up
    pub symbol: String,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Alert definition SYMBOL:above|below:THRESHOLD[:WEBHOOK_URL] (repeatable)
    #[arg(short, long = "alert", value_parser = commands::watch::parse_alert_definition, required = true)]
    pub alerts: Vec<AlertDefinition>,

    /// Override the configured evaluation interval
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Run a single evaluation pass and exit
    #[arg(long)]
    pub once: bool,
}
