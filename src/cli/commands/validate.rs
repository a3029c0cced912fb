//! Validate configuration command.

use anyhow::Result;
use pricefeed_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: &Path, config: &AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("(file not found, using defaults and environment)");
    }

    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid!");
            println!();
            println!("{}", toml::to_string_pretty(config)?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
