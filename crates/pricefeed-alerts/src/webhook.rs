//! Webhook delivery for triggered alerts.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pricefeed_core::error::NotifyError;
use pricefeed_core::traits::Notifier;
use pricefeed_core::types::{Alert, AlertCondition};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// JSON body posted to an alert's webhook.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub alert_id: &'a str,
    pub symbol: &'a str,
    pub condition: AlertCondition,
    pub threshold: f64,
    pub current_price: f64,
    /// RFC 3339 dispatch time
    pub triggered_at: String,
}

impl<'a> WebhookPayload<'a> {
    pub fn new(alert: &'a Alert, current_price: f64, dispatched_at: DateTime<Utc>) -> Self {
        Self {
            alert_id: &alert.id,
            symbol: &alert.symbol,
            condition: alert.condition,
            threshold: alert.threshold,
            current_price,
            triggered_at: dispatched_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Posts a single JSON notification per trigger. Never retries.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    /// Create a notifier whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert, observed_price: f64) -> Result<(), NotifyError> {
        // Alerts without a webhook are only polled.
        if alert.webhook_url.is_empty() {
            return Ok(());
        }

        let payload = WebhookPayload::new(alert, observed_price, Utc::now());
        let body = serde_json::to_vec(&payload).map_err(|e| NotifyError::Encode(e.to_string()))?;

        let resp = self
            .client
            .post(&alert.webhook_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        debug!(alert_id = %alert.id, url = %alert.webhook_url, "webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricefeed_data::test_support::serve_once;

    fn alert_with_hook(url: &str) -> Alert {
        Alert::new("AAPL", AlertCondition::Above, 100.0, url, Utc::now())
    }

    #[test]
    fn test_payload_shape() {
        let alert = alert_with_hook("");
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);

        let json = serde_json::to_value(WebhookPayload::new(&alert, 101.5, at)).unwrap();

        assert_eq!(json["alert_id"], "AAPL-above-100.00");
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["condition"], "above");
        assert_eq!(json["threshold"], 100.0);
        assert_eq!(json["current_price"], 101.5);
        assert_eq!(json["triggered_at"], "2024-01-02T03:04:05Z");
    }

    #[tokio::test]
    async fn test_empty_url_is_noop() {
        let notifier = WebhookNotifier::new(Duration::from_secs(1)).unwrap();
        assert!(notifier.notify(&alert_with_hook(""), 101.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_posts_json_body() {
        let (url, request) = serve_once("/hook", "200 OK", "").await;
        let notifier = WebhookNotifier::new(Duration::from_secs(5)).unwrap();

        notifier.notify(&alert_with_hook(&url), 101.0).await.unwrap();
        let request = request.await.unwrap();

        assert!(request.head.starts_with("POST /hook"));
        assert!(request.head.to_lowercase().contains("content-type: application/json"));
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["alert_id"], "AAPL-above-100.00");
        assert_eq!(body["current_price"], 101.0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (url, _request) = serve_once("/hook", "503 Service Unavailable", "").await;
        let notifier = WebhookNotifier::new(Duration::from_secs(5)).unwrap();

        let err = notifier.notify(&alert_with_hook(&url), 101.0).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status(503)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let notifier = WebhookNotifier::new(Duration::from_secs(2)).unwrap();
        let url = format!("http://127.0.0.1:{}/hook", port);

        let err = notifier.notify(&alert_with_hook(&url), 101.0).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
    }
}
