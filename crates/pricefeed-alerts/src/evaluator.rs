//! Periodic alert evaluation.

use chrono::{DateTime, Utc};
use pricefeed_core::traits::Notifier;
use pricefeed_data::PriceService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::registry::AlertRegistry;

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    /// Active alerts examined
    pub checked: usize,
    /// Alerts this pass moved to triggered
    pub triggered: usize,
    /// Alerts skipped because no price could be obtained
    pub skipped: usize,
}

/// Checks active alerts against fresh prices and fires the ones whose
/// condition holds.
pub struct AlertEvaluator {
    registry: Arc<AlertRegistry>,
    prices: Arc<PriceService>,
    notifier: Arc<dyn Notifier>,
}

impl AlertEvaluator {
    pub fn new(
        registry: Arc<AlertRegistry>,
        prices: Arc<PriceService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            prices,
            notifier,
        }
    }

    /// Get the registry this evaluator works on.
    pub fn registry(&self) -> &Arc<AlertRegistry> {
        &self.registry
    }

    /// Run one pass over every active alert.
    ///
    /// A price that cannot be fetched skips the alert until the next pass.
    /// The Active to Triggered transition is claimed in the registry before
    /// the notification goes out, so overlapping passes fire an alert at most
    /// once and a failed delivery never reverts it. An alert deleted after
    /// the pass snapshots it but before its transition is claimed sends no
    /// webhook, even when its condition was met.
    pub async fn evaluate_all(&self, now: DateTime<Utc>) -> EvaluationSummary {
        let mut summary = EvaluationSummary::default();

        for alert in self.registry.active() {
            summary.checked += 1;

            let price = match self.prices.price(&alert.symbol).await {
                Ok(price) => price,
                Err(e) => {
                    warn!(
                        alert_id = %alert.id,
                        symbol = %alert.symbol,
                        error = %e,
                        "failed to fetch price for alert check"
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            if !alert.should_trigger(price) {
                continue;
            }

            let Some(triggered) = self.registry.mark_triggered(&alert.id, now) else {
                debug!(alert_id = %alert.id, "alert gone or already triggered");
                continue;
            };
            summary.triggered += 1;

            info!(
                alert_id = %triggered.id,
                symbol = %triggered.symbol,
                price,
                threshold = triggered.threshold,
                condition = %triggered.condition,
                "alert triggered"
            );

            if let Err(e) = self.notifier.notify(&triggered, price).await {
                error!(alert_id = %triggered.id, error = %e, "failed to send webhook");
            }
        }

        summary
    }

    /// Evaluate on a fixed cadence until `cancel` fires.
    ///
    /// The first pass runs one interval after start. A pass that overruns the
    /// interval delays the next tick instead of queueing a burst.
    pub async fn run_periodic(&self, interval: Duration, cancel: CancellationToken) {
        // tokio rejects a zero period.
        let interval = interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = interval.as_millis() as u64, "starting alert checker");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let summary = self.evaluate_all(Utc::now()).await;
                    debug!(
                        checked = summary.checked,
                        triggered = summary.triggered,
                        skipped = summary.skipped,
                        "alert pass complete"
                    );
                }
            }
        }

        info!("stopping alert checker");
    }
}
