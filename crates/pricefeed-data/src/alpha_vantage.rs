//! Alpha Vantage quote source.

use async_trait::async_trait;
use chrono::NaiveDate;
use pricefeed_core::error::FetchError;
use pricefeed_core::traits::QuoteSource;
use pricefeed_core::types::{DateRange, PricePoint};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Alpha Vantage API configuration.
#[derive(Debug, Clone)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl AlphaVantageConfig {
    /// Create config for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://www.alphavantage.co/query".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Point the source at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fields Alpha Vantage uses to report problems inside a 200 response.
#[derive(Debug, Default, Deserialize)]
struct ApiNotice {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl ApiNotice {
    fn into_error(self, symbol: &str) -> Option<FetchError> {
        if self.error_message.is_some() {
            return Some(FetchError::NotFound(symbol.to_string()));
        }
        // Rate limiting is reported as a note or an information message.
        self.note
            .or(self.information)
            .map(FetchError::UpstreamUnavailable)
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(flatten)]
    notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price", default)]
    price: String,
}

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
    #[serde(flatten)]
    notice: ApiNotice,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
}

/// Quote source backed by the Alpha Vantage REST API.
pub struct AlphaVantageSource {
    config: AlphaVantageConfig,
    client: Client,
}

impl AlphaVantageSource {
    /// Create a new Alpha Vantage client.
    pub fn new(config: AlphaVantageConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(&self.config.base_url)
            .query(params)
            .query(&[("apikey", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(FetchError::UpstreamUnavailable(format!("{}: {}", status, text)));
        }

        resp.text()
            .await
            .map_err(|e| FetchError::UpstreamUnavailable(e.to_string()))
    }
}

#[async_trait]
impl QuoteSource for AlphaVantageSource {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let body = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        parse_global_quote(symbol, &body)
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        range: &DateRange,
    ) -> Result<Vec<PricePoint>, FetchError> {
        let body = self
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", "full"),
            ])
            .await?;
        let points = parse_daily_series(symbol, &body, range)?;
        debug!(symbol, points = points.len(), "parsed daily series");
        Ok(points)
    }

    fn name(&self) -> &str {
        "alpha_vantage"
    }
}

fn parse_global_quote(symbol: &str, body: &str) -> Result<f64, FetchError> {
    let response: GlobalQuoteResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let quote = match response.global_quote {
        Some(quote) => quote,
        None => {
            return Err(response
                .notice
                .into_error(symbol)
                .unwrap_or_else(|| FetchError::Parse("missing Global Quote".to_string())))
        }
    };

    // Unknown tickers come back as an empty quote object.
    if quote.price.is_empty() {
        return Err(FetchError::NotFound(symbol.to_string()));
    }

    parse_number(&quote.price)
}

fn parse_daily_series(
    symbol: &str,
    body: &str,
    range: &DateRange,
) -> Result<Vec<PricePoint>, FetchError> {
    let response: DailySeriesResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let series = match response.time_series {
        Some(series) => series,
        None => {
            return Err(response
                .notice
                .into_error(symbol)
                .unwrap_or_else(|| FetchError::NotFound(symbol.to_string())))
        }
    };

    let mut points = Vec::with_capacity(series.len());
    for (date, bar) in series {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| FetchError::Parse(format!("date {}: {}", date, e)))?;
        if !range.contains(date) {
            continue;
        }
        points.push(PricePoint::new(
            date,
            parse_number(&bar.open)?,
            parse_number(&bar.high)?,
            parse_number(&bar.low)?,
            parse_number(&bar.close)?,
        ));
    }

    Ok(points)
}

fn parse_number(value: &str) -> Result<f64, FetchError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| FetchError::Parse(format!("'{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;

    const QUOTE_BODY: &str = r#"{
        "Global Quote": {
            "01. symbol": "AAPL",
            "02. open": "149.5000",
            "05. price": "150.0000",
            "07. latest trading day": "2024-01-01"
        }
    }"#;

    const SERIES_BODY: &str = r#"{
        "Meta Data": {"2. Symbol": "AAPL"},
        "Time Series (Daily)": {
            "2024-01-03": {"1. open": "3.0", "2. high": "3.5", "3. low": "2.5", "4. close": "3.2", "5. volume": "10"},
            "2024-01-02": {"1. open": "2.0", "2. high": "2.5", "3. low": "1.5", "4. close": "2.2", "5. volume": "10"},
            "2024-01-01": {"1. open": "1.0", "2. high": "1.5", "3. low": "0.5", "4. close": "1.2", "5. volume": "10"}
        }
    }"#;

    #[test]
    fn test_parse_global_quote() {
        assert_eq!(parse_global_quote("AAPL", QUOTE_BODY).unwrap(), 150.0);
    }

    #[test]
    fn test_empty_quote_is_not_found() {
        let err = parse_global_quote("ZZZZ", r#"{"Global Quote": {}}"#).unwrap_err();
        assert_eq!(err, FetchError::NotFound("ZZZZ".to_string()));
    }

    #[test]
    fn test_rate_limit_note_is_upstream_unavailable() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let err = parse_global_quote("AAPL", body).unwrap_err();
        assert!(matches!(err, FetchError::UpstreamUnavailable(_)));
    }

    #[test]
    fn test_malformed_payloads_are_parse_errors() {
        assert!(matches!(
            parse_global_quote("AAPL", "not json"),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_global_quote("AAPL", r#"{"Global Quote": {"05. price": "abc"}}"#),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_daily_series_filters_range() {
        let all = parse_daily_series("AAPL", SERIES_BODY, &DateRange::unbounded()).unwrap();
        assert_eq!(all.len(), 3);

        let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 2), None);
        let mut window = parse_daily_series("AAPL", SERIES_BODY, &range).unwrap();
        window.sort_by_key(|p| p.date);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].open, 2.0);
        assert_eq!(window[1].close, 3.2);
    }

    #[test]
    fn test_series_error_message_is_not_found() {
        let body = r#"{"Error Message": "Invalid API call."}"#;
        let err = parse_daily_series("ZZZZ", body, &DateRange::unbounded()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_price_over_http() {
        let (url, request) = serve_once("/query", "200 OK", QUOTE_BODY).await;
        let source =
            AlphaVantageSource::new(AlphaVantageConfig::new("test-key").with_base_url(url))
                .unwrap();

        let price = source.fetch_price("AAPL").await.unwrap();
        let request = request.await.unwrap();

        assert_eq!(price, 150.0);
        assert!(request.head.contains("function=GLOBAL_QUOTE"));
        assert!(request.head.contains("symbol=AAPL"));
        assert!(request.head.contains("apikey=test-key"));
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_price_server_error() {
        let (url, _request) =
            serve_once("/query", "500 Internal Server Error", "boom").await;
        let source =
            AlphaVantageSource::new(AlphaVantageConfig::new("test-key").with_base_url(url))
                .unwrap();

        let err = source.fetch_price("AAPL").await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamUnavailable(_)));
    }
}
