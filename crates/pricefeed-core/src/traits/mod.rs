//! Core traits for the price feed.

mod notifier;
mod quote_source;

pub use notifier::Notifier;
pub use quote_source::QuoteSource;
