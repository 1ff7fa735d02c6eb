// =============================================================================
// Brokerage abstraction — the two broker capabilities the poller relies on
// =============================================================================

pub mod client;

use async_trait::async_trait;

use crate::error::BrokerError;
use crate::types::{OrderAck, OrderRequest, Position};

/// A trading account that can report positions and accept orders.
#[async_trait]
pub trait Brokerage: Send + Sync {
    /// Currently open positions, freshly fetched.
    async fn list_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// Submit one order and return the broker's acknowledgement.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError>;
}
