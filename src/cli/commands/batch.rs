//! Batch price command implementation.

use anyhow::Result;
use pricefeed_config::AppConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use super::{build_price_service, print_json};
use crate::cli::BatchArgs;

#[derive(Serialize)]
struct BatchPriceResponse {
    prices: HashMap<String, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub async fn run(args: BatchArgs, config: &AppConfig) -> Result<()> {
    let service = build_price_service(config)?;

    match service.prices(&args.symbols).await {
        Ok(result) => {
            for failure in &result.errors {
                warn!(symbol = %failure.symbol, error = %failure.error, "symbol skipped");
            }
            let errors = result.error_messages();
            print_json(&BatchPriceResponse {
                prices: result.prices,
                errors,
            })
        }
        Err(e) => {
            print_json(&BatchPriceResponse {
                prices: HashMap::new(),
                errors: e.failures().iter().map(|f| f.error.to_string()).collect(),
            })?;
            Err(e.into())
        }
    }
}
