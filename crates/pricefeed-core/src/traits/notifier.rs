//! Alert notification trait.

use crate::error::NotifyError;
use crate::types::Alert;
use async_trait::async_trait;

/// Sink for triggered alert notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification that `alert` fired at `observed_price`.
    async fn notify(&self, alert: &Alert, observed_price: f64) -> Result<(), NotifyError>;
}
