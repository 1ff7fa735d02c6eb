// =============================================================================
// Execution Engine — submits full-liquidation market sells
// =============================================================================
//
// Fire-and-forget: the outcome is logged and returned for the cycle tally,
// but nothing is retried and no order state is kept.
// =============================================================================

use std::sync::Arc;

use tracing::{info, warn};

use crate::broker::Brokerage;
use crate::types::OrderRequest;

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// The broker accepted the order.
    Submitted { order_id: String },
    /// The order could not be submitted.
    Failed { kind: String, message: String },
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submitted { order_id } => write!(f, "Submitted({order_id})"),
            Self::Failed { kind, message } => write!(f, "Failed({kind}: {message})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct ExecutionEngine<B: Brokerage> {
    pub client: Arc<B>,
}

impl<B: Brokerage> ExecutionEngine<B> {
    pub fn new(client: Arc<B>) -> Self {
        Self { client }
    }

    /// Sell the whole `qty` of `symbol` at market, time-in-force day.
    ///
    /// `qty` is forwarded verbatim from the position snapshot. Errors are
    /// logged and returned as [`ExecutionResult::Failed`]; they never
    /// propagate.
    pub async fn sell_all(&self, symbol: &str, qty: &str) -> ExecutionResult {
        let order = OrderRequest::liquidate(symbol, qty);

        match self.client.submit_order(&order).await {
            Ok(ack) => {
                // Neither id echoed back: fall back to the one we generated.
                let order_id = match ack.order_id() {
                    "" => order.client_order_id.clone(),
                    id => id.to_string(),
                };
                info!(
                    symbol,
                    qty,
                    side = %order.side,
                    order_id = %order_id,
                    status = ack.status.as_deref().unwrap_or("unknown"),
                    "SELL ALL submitted"
                );
                ExecutionResult::Submitted { order_id }
            }
            Err(e) => {
                warn!(symbol, qty, error_kind = e.kind(), error = %e, "SELL failed");
                ExecutionResult::Failed {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }
}

impl<B: Brokerage> std::fmt::Debug for ExecutionEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("client", &"<Brokerage>")
            .finish()
    }
}
