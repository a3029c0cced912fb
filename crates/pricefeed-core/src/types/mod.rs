//! Core data types for the price feed.

mod alert;
mod quote;

pub use alert::{Alert, AlertCondition};
pub use quote::{BatchResult, DateRange, PricePoint, SymbolFailure};
