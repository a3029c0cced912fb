//! Price and price-series types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FetchError;

/// One daily OHLC point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
}

impl PricePoint {
    /// Create a new point.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }
}

/// Inclusive date range for history requests. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Create a range.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Range with no bounds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Check if a date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// Stable textual form used in cache keys. Open ends render empty.
    pub fn key_fragment(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        format!("{}:{}", fmt(self.from), fmt(self.to))
    }
}

/// A symbol that could not be resolved during a batch fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: FetchError,
}

impl SymbolFailure {
    pub fn new(symbol: impl Into<String>, error: FetchError) -> Self {
        Self {
            symbol: symbol.into(),
            error,
        }
    }
}

/// Outcome of a batch fetch with at least one success (or an empty request).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    /// Resolved prices by symbol
    pub prices: HashMap<String, f64>,
    /// Informational per-symbol failures
    pub errors: Vec<SymbolFailure>,
}

impl BatchResult {
    /// Check whether every requested symbol resolved.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error messages in display form, for transports.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|f| f.error.to_string()).collect()
    }
}
