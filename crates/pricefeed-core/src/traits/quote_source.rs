//! Quote source trait definition.

use crate::error::FetchError;
use crate::types::{DateRange, PricePoint};
use async_trait::async_trait;

/// Upstream provider of prices.
///
/// Implementations may be rate limited and fallible. Callers cancel an
/// in-flight request by dropping its future.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current price for a symbol.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError>;

    /// Fetch daily history for a symbol.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `range` - Inclusive date bounds
    ///
    /// # Returns
    /// Points in whatever order the provider delivers them
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, FetchError>;

    /// Get the source name.
    fn name(&self) -> &str;
}
