//! Core types and traits for the price feed.
//!
//! This crate provides the foundational building blocks including:
//! - Price data types (PricePoint, DateRange, BatchResult)
//! - Alert definitions and their lifecycle
//! - Core traits for quote sources and alert notifiers

pub mod types;
pub mod traits;
pub mod error;

pub use error::{AlertError, BatchError, FetchError, NotifyError};
pub use types::*;
pub use traits::*;
