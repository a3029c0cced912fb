//! Price alert definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AlertError;

/// Direction an alert watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    /// Fires when the price rises strictly above the threshold
    Above,
    /// Fires when the price falls strictly below the threshold
    Below,
}

impl AlertCondition {
    /// Check the condition against an observed price.
    ///
    /// Strict comparison: a price sitting exactly on the threshold never matches.
    #[inline]
    pub fn is_met(&self, price: f64, threshold: f64) -> bool {
        match self {
            AlertCondition::Above => price > threshold,
            AlertCondition::Below => price < threshold,
        }
    }
}

impl fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertCondition {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" | ">" => Ok(AlertCondition::Above),
            "below" | "<" => Ok(AlertCondition::Below),
            _ => Err(AlertError::InvalidCondition(s.to_string())),
        }
    }
}

/// A one-shot price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Deterministic id derived from symbol, condition and threshold
    pub id: String,
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    /// Empty when the alert is only polled
    pub webhook_url: String,
    /// False once the alert has fired
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Create a new active alert.
    pub fn new(
        symbol: impl Into<String>,
        condition: AlertCondition,
        threshold: f64,
        webhook_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            id: Self::derive_id(&symbol, condition, threshold),
            symbol,
            condition,
            threshold,
            webhook_url: webhook_url.into(),
            active: true,
            created_at,
            triggered_at: None,
        }
    }

    /// Identity of an alert definition. Identical definitions share an id.
    pub fn derive_id(symbol: &str, condition: AlertCondition, threshold: f64) -> String {
        format!("{}-{}-{:.2}", symbol, condition, threshold)
    }

    /// Check whether an active alert fires at the given price.
    pub fn should_trigger(&self, price: f64) -> bool {
        self.active && self.condition.is_met(price, self.threshold)
    }

    /// Move to the terminal triggered state.
    ///
    /// Returns false, leaving the alert untouched, if it already fired.
    pub fn mark_triggered(&mut self, at: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.triggered_at = Some(at);
        true
    }

    /// Check if the alert has fired.
    pub fn is_triggered(&self) -> bool {
        self.triggered_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_is_strict() {
        assert!(AlertCondition::Above.is_met(100.01, 100.0));
        assert!(!AlertCondition::Above.is_met(100.0, 100.0));
        assert!(AlertCondition::Below.is_met(99.99, 100.0));
        assert!(!AlertCondition::Below.is_met(100.0, 100.0));
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!("above".parse::<AlertCondition>().unwrap(), AlertCondition::Above);
        assert_eq!("BELOW".parse::<AlertCondition>().unwrap(), AlertCondition::Below);
        assert!(matches!(
            "sideways".parse::<AlertCondition>(),
            Err(AlertError::InvalidCondition(_))
        ));
    }

    #[test]
    fn test_alert_id_is_deterministic() {
        let a = Alert::new("AAPL", AlertCondition::Above, 100.0, "", Utc::now());
        let b = Alert::new("AAPL", AlertCondition::Above, 100.0, "http://hook", Utc::now());

        assert_eq!(a.id, "AAPL-above-100.00");
        assert_eq!(a.id, b.id);
        assert_ne!(
            a.id,
            Alert::derive_id("AAPL", AlertCondition::Below, 100.0)
        );
    }

    #[test]
    fn test_mark_triggered_once() {
        let mut alert = Alert::new("MSFT", AlertCondition::Below, 250.0, "", Utc::now());
        let first = Utc::now();

        assert!(alert.should_trigger(249.0));
        assert!(alert.mark_triggered(first));
        assert!(!alert.active);
        assert_eq!(alert.triggered_at, Some(first));

        assert!(!alert.should_trigger(1.0));
        assert!(!alert.mark_triggered(Utc::now()));
        assert_eq!(alert.triggered_at, Some(first));
    }

    #[test]
    fn test_alert_serializes_null_triggered_at() {
        let alert = Alert::new("GOOGL", AlertCondition::Above, 3000.0, "", Utc::now());
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["condition"], "above");
        assert!(json["triggered_at"].is_null());
        assert_eq!(json["active"], true);
    }
}
