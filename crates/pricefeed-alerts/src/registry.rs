//! Alert registry.

use chrono::{DateTime, Utc};
use pricefeed_core::error::AlertError;
use pricefeed_core::types::{Alert, AlertCondition};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Sole owner of alert definitions and their lifecycle state.
#[derive(Default)]
pub struct AlertRegistry {
    alerts: RwLock<HashMap<String, Alert>>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active alert.
    ///
    /// Identical (symbol, condition, threshold) definitions share an id, so
    /// re-creating one replaces the stored record, webhook included.
    pub fn create(
        &self,
        symbol: &str,
        condition: AlertCondition,
        threshold: f64,
        webhook_url: &str,
    ) -> Result<Alert, AlertError> {
        if !threshold.is_finite() {
            return Err(AlertError::InvalidThreshold(threshold));
        }

        let alert = Alert::new(symbol, condition, threshold, webhook_url, Utc::now());
        self.write().insert(alert.id.clone(), alert.clone());

        info!(
            alert_id = %alert.id,
            symbol,
            %condition,
            threshold,
            "alert created"
        );
        Ok(alert)
    }

    /// Get an alert by id.
    pub fn get(&self, id: &str) -> Result<Alert, AlertError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| AlertError::NotFound(id.to_string()))
    }

    /// All alerts, in no particular order.
    pub fn list(&self) -> Vec<Alert> {
        self.read().values().cloned().collect()
    }

    /// Remove an alert whatever its state.
    pub fn delete(&self, id: &str) -> Result<(), AlertError> {
        self.write()
            .remove(id)
            .ok_or_else(|| AlertError::NotFound(id.to_string()))?;

        info!(alert_id = id, "alert deleted");
        Ok(())
    }

    /// Snapshot of alerts still waiting to fire.
    pub fn active(&self) -> Vec<Alert> {
        self.read().values().filter(|a| a.active).cloned().collect()
    }

    /// Transition an alert to triggered.
    ///
    /// Returns the updated record only for the caller that performed the
    /// transition. Alerts that already fired or no longer exist yield `None`.
    pub fn mark_triggered(&self, id: &str, at: DateTime<Utc>) -> Option<Alert> {
        let mut alerts = self.write();
        let alert = alerts.get_mut(id)?;
        alert.mark_triggered(at).then(|| alert.clone())
    }

    /// Number of registered alerts.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if no alerts are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Alert>> {
        self.alerts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Alert>> {
        self.alerts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let registry = AlertRegistry::new();
        let alert = registry
            .create("AAPL", AlertCondition::Above, 100.0, "")
            .unwrap();

        assert!(alert.active);
        assert!(alert.triggered_at.is_none());
        assert_eq!(registry.get(&alert.id).unwrap(), alert);
    }

    #[test]
    fn test_identical_create_overwrites() {
        let registry = AlertRegistry::new();
        let first = registry
            .create("AAPL", AlertCondition::Above, 100.0, "http://one")
            .unwrap();
        let second = registry
            .create("AAPL", AlertCondition::Above, 100.0, "http://two")
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&first.id).unwrap().webhook_url, "http://two");
    }

    #[test]
    fn test_distinct_definitions_coexist() {
        let registry = AlertRegistry::new();
        registry.create("AAPL", AlertCondition::Above, 100.0, "").unwrap();
        registry.create("AAPL", AlertCondition::Below, 100.0, "").unwrap();
        registry.create("AAPL", AlertCondition::Above, 100.5, "").unwrap();

        assert_eq!(registry.list().len(), 3);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let registry = AlertRegistry::new();
        let err = registry
            .create("AAPL", AlertCondition::Above, f64::NAN, "")
            .unwrap_err();

        assert!(matches!(err, AlertError::InvalidThreshold(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_delete() {
        let registry = AlertRegistry::new();
        let alert = registry
            .create("MSFT", AlertCondition::Below, 250.0, "")
            .unwrap();

        registry.delete(&alert.id).unwrap();

        assert_eq!(
            registry.get(&alert.id).unwrap_err(),
            AlertError::NotFound(alert.id.clone())
        );
        assert!(matches!(
            registry.delete(&alert.id),
            Err(AlertError::NotFound(_))
        ));
    }

    #[test]
    fn test_mark_triggered_only_once() {
        let registry = AlertRegistry::new();
        let alert = registry
            .create("MSFT", AlertCondition::Below, 250.0, "")
            .unwrap();
        let at = Utc::now();

        let updated = registry.mark_triggered(&alert.id, at).unwrap();
        assert!(!updated.active);
        assert_eq!(updated.triggered_at, Some(at));

        assert!(registry.mark_triggered(&alert.id, Utc::now()).is_none());
        assert_eq!(registry.get(&alert.id).unwrap().triggered_at, Some(at));
        assert!(registry.active().is_empty());
    }

    #[test]
    fn test_mark_triggered_missing_is_noop() {
        let registry = AlertRegistry::new();
        assert!(registry.mark_triggered("GONE-above-1.00", Utc::now()).is_none());
        assert!(registry.is_empty());
    }
}
