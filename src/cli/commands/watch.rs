//! Alert watch command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use pricefeed_alerts::{AlertEvaluator, AlertRegistry, WebhookNotifier};
use pricefeed_config::AppConfig;
use pricefeed_core::types::AlertCondition;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{build_price_service, print_json};
use crate::cli::WatchArgs;

/// Alert definition given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDefinition {
    pub symbol: String,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub webhook_url: String,
}

/// Parse `SYMBOL:CONDITION:THRESHOLD[:WEBHOOK_URL]`. The URL may contain colons.
pub fn parse_alert_definition(s: &str) -> Result<AlertDefinition, String> {
    let mut parts = s.splitn(4, ':');
    let symbol = parts.next().unwrap_or_default().trim();
    let condition = parts.next().ok_or("missing condition")?;
    let threshold = parts.next().ok_or("missing threshold")?;
    let webhook_url = parts.next().unwrap_or_default();

    if symbol.is_empty() {
        return Err("missing symbol".to_string());
    }

    Ok(AlertDefinition {
        symbol: symbol.to_string(),
        condition: condition.parse::<AlertCondition>().map_err(|e| format!("{}", e))?,
        threshold: threshold
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid threshold '{}': {}", threshold, e))?,
        webhook_url: webhook_url.to_string(),
    })
}

pub async fn run(args: WatchArgs, config: &AppConfig) -> Result<()> {
    let prices = build_price_service(config)?;
    let notifier = Arc::new(WebhookNotifier::new(config.alerts.webhook_timeout())?);
    let registry = Arc::new(AlertRegistry::new());

    for def in &args.alerts {
        registry
            .create(&def.symbol, def.condition, def.threshold, &def.webhook_url)
            .with_context(|| format!("Failed to create alert for {}", def.symbol))?;
    }

    let evaluator = Arc::new(AlertEvaluator::new(registry.clone(), prices, notifier));

    if args.once {
        let summary = evaluator.evaluate_all(Utc::now()).await;
        info!(
            checked = summary.checked,
            triggered = summary.triggered,
            skipped = summary.skipped,
            "single pass complete"
        );
    } else {
        let interval = args
            .interval_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.alerts.evaluation_interval());
        let cancel = CancellationToken::new();

        let checker = {
            let evaluator = evaluator.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { evaluator.run_periodic(interval, cancel).await })
        };

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("received interrupt, shutting down");
        cancel.cancel();
        checker.await.context("Alert checker task failed")?;
    }

    print_json(&registry.list())
}
