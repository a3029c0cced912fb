//! Cache-backed fetch path and batch orchestration.

use futures::future::join_all;
use pricefeed_core::error::{BatchError, FetchError};
use pricefeed_core::traits::QuoteSource;
use pricefeed_core::types::{BatchResult, DateRange, PricePoint, SymbolFailure};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::cache::ExpiringCache;

/// Key namespaces; every cache key starts with exactly one of these, so a
/// symbol can never reproduce a key from the other namespace.
const PRICE_KEY_PREFIX: &str = "price:";
const HISTORY_KEY_PREFIX: &str = "history:";

/// Value stored in the shared cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Price(f64),
    History(Arc<Vec<PricePoint>>),
}

/// Tuning for [`PriceService`].
#[derive(Debug, Clone)]
pub struct PriceServiceConfig {
    /// Lifetime of cached prices and series
    pub cache_ttl: Duration,
    /// Maximum number of cached entries
    pub cache_max_size: usize,
    /// Maximum concurrent upstream calls within batch fetches
    pub concurrency: usize,
}

impl Default for PriceServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            cache_max_size: 1000,
            concurrency: 5,
        }
    }
}

/// Price access that shields callers from the upstream quote source.
///
/// Repeated reads are served from an [`ExpiringCache`]; batch reads fan out
/// under a fixed number of permits so a burst of symbols queues instead of
/// hammering the upstream.
pub struct PriceService {
    source: Arc<dyn QuoteSource>,
    cache: ExpiringCache<CachedValue>,
    cache_ttl: Duration,
    permits: Semaphore,
    concurrency: usize,
}

impl PriceService {
    /// Create a service over a quote source.
    pub fn new(source: Arc<dyn QuoteSource>, config: PriceServiceConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        Self {
            source,
            cache: ExpiringCache::new(config.cache_max_size),
            cache_ttl: config.cache_ttl,
            permits: Semaphore::new(concurrency),
            concurrency,
        }
    }

    /// Get the current price for a symbol.
    pub async fn price(&self, symbol: &str) -> Result<f64, FetchError> {
        let key = Self::price_key(symbol);
        if let Some(CachedValue::Price(price)) = self.cache.get(&key) {
            debug!(symbol, price, "price cache hit");
            return Ok(price);
        }

        debug!(symbol, source = self.source.name(), "price cache miss");
        let price = self.source.fetch_price(symbol).await?;
        self.cache.put(key, CachedValue::Price(price), self.cache_ttl);

        Ok(price)
    }

    /// Get daily history for a symbol, oldest point first.
    pub async fn history(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let key = Self::history_key(symbol, &range);
        if let Some(CachedValue::History(points)) = self.cache.get(&key) {
            debug!(symbol, points = points.len(), "history cache hit");
            return Ok(points.as_ref().clone());
        }

        debug!(symbol, source = self.source.name(), "history cache miss");
        let mut points = self.source.fetch_history(symbol, &range).await?;
        // Providers commonly answer newest-first.
        points.sort_by_key(|p| p.date);

        self.cache.put(
            key,
            CachedValue::History(Arc::new(points.clone())),
            self.cache_ttl,
        );

        Ok(points)
    }

    /// Get prices for a set of symbols.
    ///
    /// Each symbol is resolved independently; a failure is recorded and does
    /// not affect the others. The call only fails when no symbol resolved
    /// and at least one failed. Duplicates are fetched once.
    pub async fn prices<I, S>(&self, symbols: I) -> Result<BatchResult, BatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = symbols
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let outcomes = join_all(unique.iter().map(|symbol| async move {
            (symbol, self.price_with_permit(symbol).await)
        }))
        .await;

        let mut result = BatchResult::default();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(price) => {
                    result.prices.insert(symbol.clone(), price);
                }
                Err(error) => {
                    debug!(symbol = %symbol, %error, "batch member failed");
                    result.errors.push(SymbolFailure::new(symbol.clone(), error));
                }
            }
        }

        if result.prices.is_empty() && !result.errors.is_empty() {
            info!(failed = result.errors.len(), "batch fetch failed for every symbol");
            return Err(BatchError::AllFailed(result.errors));
        }

        Ok(result)
    }

    /// Drop all cached prices and series.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("price cache cleared");
    }

    /// Number of entries currently held by the cache.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Configured batch concurrency.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Get the upstream source name.
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn price_with_permit(&self, symbol: &str) -> Result<f64, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;
        self.price(symbol).await
    }

    fn price_key(symbol: &str) -> String {
        format!("{}{}", PRICE_KEY_PREFIX, symbol)
    }

    fn history_key(symbol: &str, range: &DateRange) -> String {
        format!("{}{}:{}", HISTORY_KEY_PREFIX, symbol, range.key_fragment())
    }
}
