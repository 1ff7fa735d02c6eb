// =============================================================================
// Liquidation Poller — fetch positions, evaluate, sell, sleep, repeat
// =============================================================================
//
// Each cycle is a stateless pass over a fresh position snapshot:
//   1. List open positions (failure ends the cycle early).
//   2. Evaluate every position independently with the sell rule.
//   3. Submit a full-liquidation market sell for each qualifying position.
//
// Calls are strictly sequential, so at most one broker request is in flight.
// The fixed poll interval doubles as the retry delay after any failure.
// =============================================================================

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::broker::Brokerage;
use crate::config::LiquidatorConfig;
use crate::error::BrokerError;
use crate::execution::{ExecutionEngine, ExecutionResult};
use crate::sell_rule::{self, SellDecision};

/// Tally of one cycle, logged at debug level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub evaluated: u32,
    pub excluded: u32,
    /// Bad or malformed price data.
    pub skipped: u32,
    pub below_target: u32,
    pub submitted: u32,
    pub failed: u32,
}

pub struct Poller<'a, B: Brokerage> {
    config: &'a LiquidatorConfig,
    broker: Arc<B>,
    execution: ExecutionEngine<B>,
}

impl<'a, B: Brokerage> Poller<'a, B> {
    pub fn new(config: &'a LiquidatorConfig, broker: Arc<B>) -> Self {
        let execution = ExecutionEngine::new(broker.clone());
        Self {
            config,
            broker,
            execution,
        }
    }

    /// Run one poll-evaluate-act pass.
    ///
    /// Only a failure to list positions is returned; per-position and
    /// per-order failures are logged and counted in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, BrokerError> {
        let positions = self.broker.list_positions().await?;
        let mut report = CycleReport::default();

        if positions.is_empty() {
            info!("No open positions.");
            return Ok(report);
        }

        for position in &positions {
            report.evaluated += 1;

            match sell_rule::evaluate(position, self.config) {
                SellDecision::Sell { .. } => {}
                SellDecision::Excluded => {
                    report.excluded += 1;
                    continue;
                }
                SellDecision::BelowTarget { .. } => {
                    report.below_target += 1;
                    continue;
                }
                SellDecision::BadPrices { .. } | SellDecision::Malformed(_) => {
                    report.skipped += 1;
                    continue;
                }
            }

            let symbol = position.symbol.trim();
            let Some(qty) = position.qty.as_deref().filter(|q| !q.trim().is_empty()) else {
                warn!(
                    symbol,
                    error_kind = "MissingQuantity",
                    "SELL failed: position has no quantity"
                );
                report.failed += 1;
                continue;
            };

            match self.execution.sell_all(symbol, qty).await {
                ExecutionResult::Submitted { .. } => report.submitted += 1,
                ExecutionResult::Failed { .. } => report.failed += 1,
            }
        }

        debug!(
            evaluated = report.evaluated,
            excluded = report.excluded,
            skipped = report.skipped,
            below_target = report.below_target,
            submitted = report.submitted,
            failed = report.failed,
            "cycle complete"
        );
        Ok(report)
    }

    /// Poll until the process is killed. Never returns.
    pub async fn run_forever(&self) {
        let interval = self.config.poll_interval();
        loop {
            if let Err(e) = self.run_cycle().await {
                error!(error_kind = e.kind(), error = %e, "Top-level error");
            }
            tokio::time::sleep(interval).await;
        }
    }
}
