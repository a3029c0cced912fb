//! CLI command implementations.

pub mod batch;
pub mod history;
pub mod price;
pub mod validate;
pub mod watch;

use anyhow::{Context, Result};
use pricefeed_config::{AppConfig, Provider};
use pricefeed_core::traits::QuoteSource;
use pricefeed_data::{
    AlphaVantageConfig, AlphaVantageSource, LoggedSource, PriceService, PriceServiceConfig,
    StaticQuoteSource,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Build the cached fetch path for the configured provider.
pub fn build_price_service(config: &AppConfig) -> Result<Arc<PriceService>> {
    config.validate().context("Invalid configuration")?;

    let source: Arc<dyn QuoteSource> = match config.upstream.provider {
        Provider::Static => Arc::new(LoggedSource::new(StaticQuoteSource::default())),
        Provider::AlphaVantage => {
            let api_key = config
                .upstream
                .api_key()
                .with_context(|| format!("{} is not set", config.upstream.api_key_env))?;
            let av_config = AlphaVantageConfig::new(api_key)
                .with_base_url(config.upstream.base_url.clone())
                .with_timeout(config.upstream.timeout());
            Arc::new(LoggedSource::new(AlphaVantageSource::new(av_config)?))
        }
    };

    let service = PriceService::new(
        source,
        PriceServiceConfig {
            cache_ttl: config.cache.ttl(),
            cache_max_size: config.cache.max_size,
            concurrency: config.fetch.concurrency,
        },
    );
    info!(
        source = service.source_name(),
        concurrency = service.concurrency(),
        "price service ready"
    );

    Ok(Arc::new(service))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
