// =============================================================================
// Logging — one plain-text line per event on stdout
// =============================================================================
//
// Line shape (for an external log aggregator):
//   [alpaca-sell-winners] 2025-03-14 15:09:26Z  INFO evaluated symbol=AAPL ...
// =============================================================================

use chrono::{DateTime, Utc};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

/// Fixed source tag at the start of every line.
pub const LOG_PREFIX: &str = "[alpaca-sell-winners]";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Timer that writes the source prefix followed by a UTC timestamp.
struct PrefixedUtc;

impl FormatTime for PrefixedUtc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        w.write_str(&line_prefix(Utc::now()))
    }
}

fn line_prefix(now: DateTime<Utc>) -> String {
    format!("{LOG_PREFIX} {}", now.format(TIMESTAMP_FORMAT))
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_timer(PrefixedUtc)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stdout)
        .init();
}
