//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Semantic configuration problems found by [`AppConfig::validate`].
#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} is required when upstream.provider = \"alpha_vantage\"")]
    MissingApiKey(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
}

impl AppConfig {
    /// Check values the type system cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cache.max_size == 0 {
            return Err(SettingsError::Zero("cache.max_size"));
        }
        if self.fetch.concurrency == 0 {
            return Err(SettingsError::Zero("fetch.concurrency"));
        }
        if self.alerts.evaluation_interval_secs == 0 {
            return Err(SettingsError::Zero("alerts.evaluation_interval_secs"));
        }
        if self.upstream.provider == Provider::AlphaVantage && self.upstream.api_key().is_none() {
            return Err(SettingsError::MissingApiKey(
                self.upstream.api_key_env.clone(),
            ));
        }
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "pricefeed".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Upstream quote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Built-in price table
    #[default]
    Static,
    AlphaVantage,
}

/// Upstream quote provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    pub provider: Provider,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl UpstreamSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Static,
            api_key_env: "ALPHA_VANTAGE_API_KEY".to_string(),
            base_url: "https://www.alphavantage.co/query".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Price cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_size: usize,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_size: 1000,
        }
    }
}

/// Batch fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Concurrent upstream calls allowed per batch service
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { concurrency: 5 }
    }
}

/// Alert evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    pub evaluation_interval_secs: u64,
    pub webhook_timeout_secs: u64,
}

impl AlertSettings {
    pub fn evaluation_interval(&self) -> Duration {
        Duration::from_secs(self.evaluation_interval_secs)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            evaluation_interval_secs: 30,
            webhook_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(AppConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut config = AppConfig::default();
        config.cache.max_size = 0;
        assert_eq!(config.validate(), Err(SettingsError::Zero("cache.max_size")));

        let mut config = AppConfig::default();
        config.fetch.concurrency = 0;
        assert_eq!(config.validate(), Err(SettingsError::Zero("fetch.concurrency")));

        let mut config = AppConfig::default();
        config.alerts.evaluation_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_alpha_vantage_requires_key() {
        let mut config = AppConfig::default();
        config.upstream.provider = Provider::AlphaVantage;
        config.upstream.api_key_env = "PRICEFEED_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        assert_eq!(
            config.validate(),
            Err(SettingsError::MissingApiKey(
                "PRICEFEED_TEST_KEY_THAT_IS_NEVER_SET".to_string()
            ))
        );
    }
}
