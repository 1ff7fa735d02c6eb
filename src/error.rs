// =============================================================================
// Error types — startup configuration and broker communication
// =============================================================================

use thiserror::Error;

/// Fatal errors raised while reading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the ALPACA_* nor the APCA_* credential pair resolved.
    #[error("Missing ALPACA_API_KEY / ALPACA_SECRET_KEY (or APCA_* equivalents).")]
    MissingCredentials,

    /// An env variable was present but could not be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors surfaced by a brokerage client.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Transport failure: connect, timeout, TLS.
    #[error("network error: {0}")]
    Network(String),

    /// The broker answered with a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl BrokerError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Short name of the error class, used where log lines report the
    /// error type alongside its message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "NetworkError",
            Self::Api { .. } => "APIError",
            Self::Decode(_) => "DecodeError",
        }
    }
}

impl From<reqwest::Error> for BrokerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
