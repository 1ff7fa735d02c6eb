// =============================================================================
// Alpaca REST API Client — static key-pair authenticated requests
// =============================================================================
//
// SECURITY: the secret key is only ever placed in a sensitive header value.
// It is never logged, and `Debug` redacts both credentials.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::broker::Brokerage;
use crate::config::Credentials;
use crate::error::BrokerError;
use crate::types::{OrderAck, OrderRequest, Position};

/// Per-request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Alpaca trading API client.
#[derive(Clone)]
pub struct AlpacaClient {
    base_url: String,
    client: reqwest::Client,
}

impl AlpacaClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `AlpacaClient`.
    ///
    /// # Arguments
    /// * `base_url`    — e.g. `https://api.alpaca.markets` (no trailing slash).
    /// * `credentials` — key id and secret, sent as `APCA-API-*` headers.
    pub fn new(base_url: impl Into<String>, credentials: &Credentials) -> Result<Self, BrokerError> {
        let base_url = base_url.into();

        let mut default_headers = HeaderMap::new();
        let key_id = HeaderValue::from_str(&credentials.key_id)
            .map_err(|e| BrokerError::Network(format!("invalid API key header: {e}")))?;
        let mut secret = HeaderValue::from_str(&credentials.secret_key)
            .map_err(|e| BrokerError::Network(format!("invalid API secret header: {e}")))?;
        secret.set_sensitive(true);
        default_headers.insert("APCA-API-KEY-ID", key_id);
        default_headers.insert("APCA-API-SECRET-KEY", secret);

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BrokerError::Network(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, "AlpacaClient initialised");

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// Check the status, then decode the body as `T`.
    ///
    /// Non-success responses become [`BrokerError::Api`], carrying Alpaca's
    /// `message` field when the body has one and the raw body otherwise.
    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        endpoint: &str,
    ) -> Result<T, BrokerError> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(BrokerError::api(status.as_u16(), api_message(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| BrokerError::Decode(format!("{endpoint} response: {e}")))
    }
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl Brokerage for AlpacaClient {
    /// GET /v2/positions.
    #[instrument(skip(self), name = "alpaca::list_positions")]
    async fn list_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let url = format!("{}/v2/positions", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let positions: Vec<Position> = Self::read_json(resp, "GET /v2/positions").await?;
        debug!(count = positions.len(), "positions retrieved");
        Ok(positions)
    }

    /// POST /v2/orders.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, qty = %order.qty), name = "alpaca::submit_order")]
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck, BrokerError> {
        let url = format!("{}/v2/orders", self.base_url);
        debug!(client_order_id = %order.client_order_id, "placing order");
        let resp = self.client.post(&url).json(order).send().await?;
        let ack: OrderAck = Self::read_json(resp, "POST /v2/orders").await?;
        debug!(order_id = %ack.order_id(), "order accepted");
        Ok(ack)
    }
}

impl std::fmt::Debug for AlpacaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaClient")
            .field("credentials", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn creds() -> Credentials {
        Credentials {
            key_id: "PKTEST".to_string(),
            secret_key: "s3cr3t".to_string(),
        }
    }

    async fn client_for(server: &MockServer) -> AlpacaClient {
        AlpacaClient::new(server.uri(), &creds()).unwrap()
    }

    #[tokio::test]
    async fn list_positions_sends_auth_headers_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/positions"))
            .and(header("APCA-API-KEY-ID", "PKTEST"))
            .and(header("APCA-API-SECRET-KEY", "s3cr3t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"symbol": "AAPL", "avg_entry_price": "100", "current_price": "115", "qty": "3"},
                {"symbol": "VIG", "avg_entry_price": "50", "current_price": "80", "qty": "10"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let positions = client_for(&server).await.list_positions().await.unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].symbol, "AAPL");
        assert_eq!(positions[1].qty.as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn empty_position_list_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/positions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let positions = client_for(&server).await.list_positions().await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/positions"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"code": 40110000, "message": "request is not authorized"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_positions().await.unwrap_err();
        match err {
            BrokerError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "request is not authorized");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unexpected_body_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/positions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.list_positions().await.unwrap_err();
        assert!(matches!(err, BrokerError::Decode(_)));
    }

    #[tokio::test]
    async fn submit_order_posts_full_liquidation_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .and(header("APCA-API-KEY-ID", "PKTEST"))
            .and(body_partial_json(serde_json::json!({
                "symbol": "AAPL",
                "qty": "3.25",
                "side": "sell",
                "type": "market",
                "time_in_force": "day"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "61e69015-8549-4bfd-b9c3-01e75843f47d",
                "client_order_id": "eb9e2aaa-f71a-4f51-b5b4-52a6c565dad4",
                "status": "accepted"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = OrderRequest::liquidate("AAPL", "3.25");
        let ack = client_for(&server).await.submit_order(&order).await.unwrap();
        assert_eq!(ack.order_id(), "61e69015-8549-4bfd-b9c3-01e75843f47d");
        assert_eq!(ack.status.as_deref(), Some("accepted"));
    }

    #[tokio::test]
    async fn rejected_order_keeps_raw_body_when_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/orders"))
            .respond_with(ResponseTemplate::new(422).set_body_string("qty must be > 0"))
            .mount(&server)
            .await;

        let order = OrderRequest::liquidate("AAPL", "0");
        let err = client_for(&server).await.submit_order(&order).await.unwrap_err();
        match err {
            BrokerError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "qty must be > 0");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_network_error() {
        let client = AlpacaClient::new("http://127.0.0.1:1", &creds()).unwrap();
        let err = client.list_positions().await.unwrap_err();
        assert!(matches!(err, BrokerError::Network(_)), "got {err:?}");
    }

    #[test]
    fn debug_redacts_credentials() {
        let client = AlpacaClient::new("https://paper-api.alpaca.markets", &creds()).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("s3cr3t"));
        assert!(!dbg.contains("PKTEST"));
        assert_eq!(client.base_url(), "https://paper-api.alpaca.markets");
    }
}
