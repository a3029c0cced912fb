//! Single price command implementation.

use anyhow::{Context, Result};
use pricefeed_config::AppConfig;
use serde::Serialize;

use super::{build_price_service, print_json};
use crate::cli::PriceArgs;

#[derive(Serialize)]
struct PriceResponse<'a> {
    symbol: &'a str,
    price: f64,
}

pub async fn run(args: PriceArgs, config: &AppConfig) -> Result<()> {
    let service = build_price_service(config)?;

    let price = service
        .price(&args.symbol)
        .await
        .with_context(|| format!("Failed to fetch price for {}", args.symbol))?;

    print_json(&PriceResponse {
        symbol: &args.symbol,
        price,
    })
}
