//! In-memory quote source.

use async_trait::async_trait;
use chrono::NaiveDate;
use pricefeed_core::error::FetchError;
use pricefeed_core::traits::QuoteSource;
use pricefeed_core::types::{DateRange, PricePoint};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Days of synthetic history produced per symbol.
const HISTORY_DAYS: usize = 5;

/// (open, high, low, close) offsets from the base price, one row per day.
const HISTORY_SHAPE: [(f64, f64, f64, f64); HISTORY_DAYS] = [
    (-5.0, 5.0, -10.0, -2.0),
    (-2.0, 3.0, -5.0, 1.0),
    (1.0, 8.0, -3.0, 5.0),
    (5.0, 10.0, 0.0, 3.0),
    (3.0, 7.0, 1.0, 6.0),
];

/// Quote source backed by an injected price table.
///
/// History is synthesized around each base price starting 2024-01-01 and
/// handed back newest-first, the way most HTTP providers answer.
pub struct StaticQuoteSource {
    prices: RwLock<HashMap<String, f64>>,
    requests: AtomicUsize,
}

impl StaticQuoteSource {
    /// Create a source over the given prices.
    pub fn new(prices: HashMap<String, f64>) -> Self {
        Self {
            prices: RwLock::new(prices),
            requests: AtomicUsize::new(0),
        }
    }

    /// Set or replace the price for a symbol.
    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), price);
    }

    /// Number of requests served so far, prices and history combined.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn lookup(&self, symbol: &str) -> Result<f64, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .copied()
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))
    }
}

impl Default for StaticQuoteSource {
    fn default() -> Self {
        Self::new(HashMap::from([
            ("AAPL".to_string(), 150.0),
            ("MSFT".to_string(), 300.0),
            ("GOOGL".to_string(), 2800.0),
        ]))
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        self.lookup(symbol)
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let base = self.lookup(symbol)?;
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .ok_or_else(|| FetchError::Parse("invalid history start date".to_string()))?;

        let mut points: Vec<PricePoint> = start
            .iter_days()
            .zip(HISTORY_SHAPE)
            .filter(|(date, _)| range.contains(*date))
            .map(|(date, (open, high, low, close))| {
                PricePoint::new(date, base + open, base + high, base + low, base + close)
            })
            .collect();
        points.reverse();

        Ok(points)
    }

    fn name(&self) -> &str {
        "static"
    }
}
