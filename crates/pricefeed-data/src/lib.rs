//! Quote sources, the expiring cache and the cached fetch path.

mod alpha_vantage;
mod cache;
mod logged;
mod service;
mod static_source;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use alpha_vantage::{AlphaVantageConfig, AlphaVantageSource};
pub use cache::ExpiringCache;
pub use logged::LoggedSource;
pub use service::{CachedValue, PriceService, PriceServiceConfig};
pub use static_source::StaticQuoteSource;
