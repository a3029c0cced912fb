//! Price history command implementation.

use anyhow::{Context, Result};
use pricefeed_config::AppConfig;
use pricefeed_core::types::{DateRange, PricePoint};
use serde::Serialize;

use super::{build_price_service, print_json};
use crate::cli::HistoryArgs;

#[derive(Serialize)]
struct HistoricalPriceResponse<'a> {
    symbol: &'a str,
    data: Vec<PricePoint>,
}

pub async fn run(args: HistoryArgs, config: &AppConfig) -> Result<()> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        anyhow::ensure!(from <= to, "--from ({}) is after --to ({})", from, to);
    }

    let service = build_price_service(config)?;
    let data = service
        .history(&args.symbol, DateRange::new(args.from, args.to))
        .await
        .with_context(|| format!("Failed to fetch history for {}", args.symbol))?;

    print_json(&HistoricalPriceResponse {
        symbol: &args.symbol,
        data,
    })
}
