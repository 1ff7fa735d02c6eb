// =============================================================================
// Shared wire types for the Alpaca trading API
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Snapshot of one open position as returned by `GET /v2/positions`.
///
/// Numeric fields stay as the broker's strings; parsing happens in the sell
/// rule so that one malformed position never fails the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub symbol: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub avg_entry_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub current_price: Option<String>,
    /// Secondary price field, consulted only when `current_price` is absent.
    #[serde(default, deserialize_with = "string_or_number")]
    pub asset_current_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub qty: Option<String>,
}

impl Position {
    /// Current price with the `asset_current_price` fallback applied.
    pub fn effective_current_price(&self) -> Option<&str> {
        non_empty(self.current_price.as_deref())
            .or_else(|| non_empty(self.asset_current_price.as_deref()))
    }

    /// Symbol for log lines; `?` when the broker sent none.
    pub fn display_symbol(&self) -> String {
        let sym = self.symbol.trim();
        if sym.is_empty() {
            "?".to_string()
        } else {
            sym.to_uppercase()
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Accept a JSON string, number, or null for a field the broker normally
/// sends as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

// Only the variants this bot ever sends are modelled.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Body of `POST /v2/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    /// Quantity exactly as the broker reported it on the position.
    pub qty: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub client_order_id: String,
}

impl OrderRequest {
    /// Market sell for the full `qty`, good for the day.
    pub fn liquidate(symbol: impl Into<String>, qty: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            qty: qty.into(),
            side: OrderSide::Sell,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            client_order_id: Uuid::new_v4().to_string(),
        }
    }
}

/// The subset of the broker's order object we look at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderAck {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub client_order_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderAck {
    /// Server-assigned id, falling back to the client id.
    pub fn order_id(&self) -> &str {
        if self.id.is_empty() {
            &self.client_order_id
        } else {
            &self.id
        }
    }
}
