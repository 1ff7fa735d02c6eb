// =============================================================================
// Liquidator Configuration — read once from the environment at startup
// =============================================================================
//
// The configuration is immutable after construction and passed by reference
// into the poller, the sell rule, and the execution engine. There is no
// reload: changing a variable requires a restart.
//
// Variables:
//   TARGET_PROFIT_PCT   fractional gain threshold            (default 0.10)
//   SLEEP_SEC           poll interval seconds, floor 5       (default 60)
//   EXCLUDE_SYMBOLS     comma-separated, case-insensitive    (default "VIG")
//   ALPACA_API_KEY      | APCA_API_KEY_ID       credential id
//   ALPACA_SECRET_KEY   | APCA_API_SECRET_KEY   credential secret
//   APCA_API_BASE_URL   broker endpoint
// =============================================================================

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::error::ConfigError;

/// Alpaca live-trading endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.alpaca.markets";

/// The poll interval is never shorter than this.
pub const MIN_SLEEP_SECS: i64 = 5;

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_target_profit_pct() -> Decimal {
    // 0.10
    Decimal::new(10, 2)
}

fn default_sleep_secs() -> i64 {
    60
}

fn default_exclude_symbols() -> &'static str {
    "VIG"
}

// =============================================================================
// Credentials
// =============================================================================

/// API key pair. Never printed: `Debug` redacts both halves.
#[derive(Clone)]
pub struct Credentials {
    pub key_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// LiquidatorConfig
// =============================================================================

#[derive(Debug, Clone)]
pub struct LiquidatorConfig {
    /// Minimum fractional gain (0.10 = 10 %) that triggers a sell.
    pub target_profit_pct: Decimal,

    /// Poll interval as configured; see [`LiquidatorConfig::poll_interval`].
    pub sleep_secs: i64,

    /// Upper-cased symbols that are never sold.
    pub exclude_symbols: BTreeSet<String>,

    /// Broker endpoint without a trailing slash.
    pub base_url: String,

    pub credentials: Credentials,
}

impl LiquidatorConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let key_id = non_empty("ALPACA_API_KEY").or_else(|| non_empty("APCA_API_KEY_ID"));
        let secret_key =
            non_empty("ALPACA_SECRET_KEY").or_else(|| non_empty("APCA_API_SECRET_KEY"));
        let credentials = match (key_id, secret_key) {
            (Some(key_id), Some(secret_key)) => Credentials { key_id, secret_key },
            _ => return Err(ConfigError::MissingCredentials),
        };

        let target_profit_pct = match non_empty("TARGET_PROFIT_PCT") {
            Some(raw) => parse_decimal("TARGET_PROFIT_PCT", &raw)?,
            None => default_target_profit_pct(),
        };

        let sleep_secs = match non_empty("SLEEP_SEC") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                name: "SLEEP_SEC",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => default_sleep_secs(),
        };

        // An explicitly empty EXCLUDE_SYMBOLS means "exclude nothing".
        let exclude_raw =
            lookup("EXCLUDE_SYMBOLS").unwrap_or_else(|| default_exclude_symbols().to_string());
        let exclude_symbols = parse_symbol_list(&exclude_raw);

        let base_url = non_empty("APCA_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            target_profit_pct,
            sleep_secs,
            exclude_symbols,
            base_url,
            credentials,
        })
    }

    /// Sleep between cycles, floored at [`MIN_SLEEP_SECS`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_secs.max(MIN_SLEEP_SECS) as u64)
    }

    /// Case-insensitive exclusion check.
    pub fn is_excluded(&self, symbol: &str) -> bool {
        self.exclude_symbols.contains(&symbol.trim().to_uppercase())
    }

    /// Threshold as a whole percent, truncated (0.155 -> 15). `None` when
    /// the threshold is too large to scale by 100.
    pub fn target_profit_whole_pct(&self) -> Option<Decimal> {
        self.target_profit_pct
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|pct| pct.trunc())
    }
}

fn parse_decimal(name: &'static str, raw: &str) -> Result<Decimal, ConfigError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| ConfigError::Invalid {
            name,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_symbol_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
