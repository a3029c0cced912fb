//! Configuration management.

mod settings;

pub use settings::{
    AlertSettings, AppConfig, AppSettings, CacheSettings, FetchSettings, LoggingConfig,
    Provider, SettingsError, UpstreamSettings,
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Environment prefix, e.g. `PRICEFEED__CACHE__TTL_SECS=60`.
const ENV_PREFIX: &str = "PRICEFEED";

/// Load configuration from an optional file and the environment.
///
/// A missing file falls back to defaults; environment variables win.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Parse configuration from TOML text.
pub fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
