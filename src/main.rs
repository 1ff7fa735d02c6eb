// =============================================================================
// Alpaca Sell Winners — Main Entry Point
// =============================================================================
//
// Polls the Alpaca account every SLEEP_SEC seconds and sells, at market and in
// full, any position up at least TARGET_PROFIT_PCT on its average entry.
// Symbols in EXCLUDE_SYMBOLS are never sold. Runs until the process is killed.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod broker;
mod config;
mod error;
mod execution;
mod logging;
mod poller;
mod sell_rule;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use crate::broker::client::AlpacaClient;
use crate::config::LiquidatorConfig;
use crate::poller::Poller;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();
    logging::init();

    // ── 2. Configuration (fatal before any network call) ─────────────────
    let config = LiquidatorConfig::from_env()
        .inspect_err(|e| error!(error = %e, "fatal configuration error"))
        .context("refusing to start")?;

    // ── 3. Broker client ─────────────────────────────────────────────────
    let client = AlpacaClient::new(&config.base_url, &config.credentials)
        .context("failed to build Alpaca client")?;

    let exclude: Vec<&str> = config.exclude_symbols.iter().map(String::as_str).collect();
    let target_profit = match config.target_profit_whole_pct() {
        Some(pct) => format!("{pct}%"),
        None => format!("{} (fraction)", config.target_profit_pct),
    };
    info!(
        target_profit = %target_profit,
        exclude = ?exclude,
        base = %client.base_url(),
        poll_interval_secs = config.poll_interval().as_secs(),
        "Started"
    );

    // ── 4. Poll loop ─────────────────────────────────────────────────────
    Poller::new(&config, Arc::new(client)).run_forever().await;
    Ok(())
}
