//! Error types for the price feed.

use thiserror::Error;

use crate::types::SymbolFailure;

/// Errors raised while obtaining a price or a price series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Symbol not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// True when the upstream has no price for the symbol.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// Batch fetch failure. Only raised when no symbol could be resolved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("failed to fetch prices for any symbol ({} errors)", .0.len())]
    AllFailed(Vec<SymbolFailure>),
}

impl BatchError {
    /// Per-symbol errors collected during the batch.
    pub fn failures(&self) -> &[SymbolFailure] {
        match self {
            BatchError::AllFailed(failures) => failures,
        }
    }
}

/// Alert registry errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Alert not found: {0}")]
    NotFound(String),

    #[error("Invalid alert condition: {0}")]
    InvalidCondition(String),

    #[error("Invalid alert threshold: {0}")]
    InvalidThreshold(f64),
}

/// Webhook delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to encode notification: {0}")]
    Encode(String),

    #[error("Failed to send notification: {0}")]
    Transport(String),

    #[error("Webhook returned status {0}")]
    Status(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_error_exposes_failures() {
        let err = BatchError::AllFailed(vec![
            SymbolFailure::new("X", FetchError::NotFound("X".into())),
            SymbolFailure::new("Y", FetchError::Parse("bad".into())),
        ]);

        assert_eq!(err.failures().len(), 2);
        assert!(err.to_string().contains("2 errors"));
        assert!(err.failures()[0].error.is_not_found());
        assert!(!err.failures()[1].error.is_not_found());
    }
}
