//! Logging decorator for quote sources.

use async_trait::async_trait;
use pricefeed_core::error::FetchError;
use pricefeed_core::traits::QuoteSource;
use pricefeed_core::types::{DateRange, PricePoint};
use std::time::Instant;
use tracing::{info, warn};

/// Wraps a quote source and logs every upstream call with its latency.
pub struct LoggedSource<S> {
    inner: S,
}

impl<S: QuoteSource> LoggedSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: QuoteSource> QuoteSource for LoggedSource<S> {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let begin = Instant::now();
        let result = self.inner.fetch_price(symbol).await;
        let took_ms = begin.elapsed().as_millis() as u64;

        match &result {
            Ok(price) => info!(source = self.inner.name(), symbol, price, took_ms, "fetch price"),
            Err(error) => warn!(source = self.inner.name(), symbol, %error, took_ms, "fetch price"),
        }
        result
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let begin = Instant::now();
        let result = self.inner.fetch_history(symbol, range).await;
        let took_ms = begin.elapsed().as_millis() as u64;
        let from = range.from.map(|d| d.to_string()).unwrap_or_default();
        let to = range.to.map(|d| d.to_string()).unwrap_or_default();

        match &result {
            Ok(points) => info!(
                source = self.inner.name(),
                symbol,
                from = %from,
                to = %to,
                count = points.len(),
                took_ms,
                "fetch price history"
            ),
            Err(error) => warn!(
                source = self.inner.name(),
                symbol,
                from = %from,
                to = %to,
                %error,
                took_ms,
                "fetch price history"
            ),
        }
        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
