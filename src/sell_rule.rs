// =============================================================================
// Sell Rule — decides whether one position should be liquidated
// =============================================================================
//
// Rule, in order:
//   1. Symbol (upper-cased) in the exclusion set   -> keep
//   2. Average or current price missing / <= 0     -> keep
//   3. gain = (current - average) / average
//   4. gain >= target_profit_pct (inclusive)       -> sell
//
// Malformed data never escapes this module: it becomes a `Malformed`
// decision, which is a "keep".
// =============================================================================

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::LiquidatorConfig;
use crate::types::Position;

/// Outcome of evaluating one position.
#[derive(Debug, Clone, PartialEq)]
pub enum SellDecision {
    Excluded,
    BadPrices { avg: Decimal, current: Decimal },
    Malformed(String),
    BelowTarget { gain: Decimal },
    Sell { gain: Decimal },
}

impl SellDecision {
    pub fn should_sell(&self) -> bool {
        matches!(self, Self::Sell { .. })
    }
}

/// Evaluate `position` against the configured target and exclusion list.
///
/// Emits exactly one log line describing the decision.
pub fn evaluate(position: &Position, config: &LiquidatorConfig) -> SellDecision {
    match try_evaluate(position, config) {
        Ok(decision) => decision,
        Err(reason) => {
            warn!(
                symbol = %position.display_symbol(),
                error = %reason,
                "Error evaluating position"
            );
            SellDecision::Malformed(reason)
        }
    }
}

fn try_evaluate(position: &Position, config: &LiquidatorConfig) -> Result<SellDecision, String> {
    let symbol = position.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err("position has no symbol".to_string());
    }

    if config.is_excluded(&symbol) {
        info!(symbol = %symbol, "Skipping (excluded).");
        return Ok(SellDecision::Excluded);
    }

    let avg = parse_price("avg_entry_price", position.avg_entry_price.as_deref())?;
    let current = parse_price("current_price", position.effective_current_price())?;

    if avg <= Decimal::ZERO || current <= Decimal::ZERO {
        info!(symbol = %symbol, avg = %avg, current = %current, "Bad prices; skip.");
        return Ok(SellDecision::BadPrices { avg, current });
    }

    let gain = current
        .checked_sub(avg)
        .and_then(|diff| diff.checked_div(avg))
        .ok_or_else(|| format!("gain overflow for avg={avg} current={current}"))?;

    info!(
        symbol = %symbol,
        avg = %format!("{avg:.4}"),
        current = %format!("{current:.4}"),
        gain = %format_gain(gain),
        "evaluated"
    );

    if gain >= config.target_profit_pct {
        Ok(SellDecision::Sell { gain })
    } else {
        Ok(SellDecision::BelowTarget { gain })
    }
}

/// Gain as a percentage with two decimals. A gain too large to scale by
/// 100 is printed as the raw fraction instead.
fn format_gain(gain: Decimal) -> String {
    match gain.checked_mul(Decimal::ONE_HUNDRED) {
        Some(pct) => format!("{pct:.2}%"),
        None => format!("{gain} (fraction)"),
    }
}

/// Missing or blank prices read as zero; anything else must parse.
fn parse_price(field: &str, raw: Option<&str>) -> Result<Decimal, String> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(Decimal::ZERO),
    };
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| format!("could not parse {field}={raw:?}: {e}"))
}
