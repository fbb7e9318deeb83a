//! HTTP client for the bridge quote service

use std::str::FromStr;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use crate::domain::entities::{BridgeQuote, QuoteRequest};
use crate::domain::repositories::QuoteProvider;
use crate::shared::constants::{CLIENT_ID_HEADER, QUOTE_PREPARE_PATH};
use crate::shared::error::BridgeError;

pub struct HttpQuoteProvider {
    client: Client,
    base_url: String,
}

impl HttpQuoteProvider {
    pub fn new(base_url: &str, client_id: Option<&str>, timeout: Duration) -> Result<Self, BridgeError> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        if let Some(client_id) = client_id.filter(|id| !id.is_empty()) {
            let name = HeaderName::from_str(CLIENT_ID_HEADER)
                .map_err(|e| BridgeError::config(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::from_str(client_id)
                .map_err(|e| BridgeError::config(format!("Invalid client id: {}", e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, QUOTE_PREPARE_PATH)
    }
}

/// Quote body, either bare or wrapped in `{"data": ...}`
pub fn parse_quote_response(value: serde_json::Value) -> Result<BridgeQuote, BridgeError> {
    let quote = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") && !map.contains_key("steps") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(quote).map_err(|e| BridgeError::quote(format!("Malformed quote: {}", e)))
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn prepare_buy(&self, request: &QuoteRequest) -> Result<BridgeQuote, BridgeError> {
        let origin_chain = request.origin_chain_id.to_string();
        let destination_chain = request.destination_chain_id.to_string();
        let query = [
            ("originChainId", origin_chain.as_str()),
            ("originTokenAddress", request.origin_token_address.as_str()),
            ("destinationChainId", destination_chain.as_str()),
            ("destinationTokenAddress", request.destination_token_address.as_str()),
            ("amount", request.amount.as_str()),
            ("sender", request.sender.as_str()),
            ("receiver", request.receiver.as_str()),
        ];
        log::debug!(
            "Requesting quote {}:{} -> {}:{} for {}",
            origin_chain,
            request.origin_token_address,
            destination_chain,
            request.destination_token_address,
            request.amount
        );

        let resp = self
            .client
            .get(self.endpoint())
            .query(&query)
            .send()
            .await
            .map_err(|e| BridgeError::network(format!("Quote request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BridgeError::quote(format!("Quote service returned {}: {}", status, body)));
        }

        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BridgeError::quote(format!("Invalid quote response: {}", e)))?;
        parse_quote_response(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{serve_json_once, serve_once, TEST_ACCOUNT};
    use serde_json::json;

    fn request() -> QuoteRequest {
        QuoteRequest {
            origin_chain_id: 1,
            origin_token_address: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string(),
            destination_chain_id: 137,
            destination_token_address: "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".to_string(),
            amount: "100000000".to_string(),
            sender: TEST_ACCOUNT.to_string(),
            receiver: TEST_ACCOUNT.to_string(),
        }
    }

    #[test]
    fn test_parse_enveloped_and_bare_quotes() {
        let bare = parse_quote_response(json!({"steps": [], "originAmount": "5"})).expect("bare");
        assert_eq!(bare.from_amount.as_deref(), Some("5"));

        let wrapped = parse_quote_response(json!({"data": {"steps": [{"transactions": []}]}})).expect("wrapped");
        assert_eq!(wrapped.steps.len(), 1);

        assert!(parse_quote_response(json!({"steps": "nope"})).is_err());
    }

    #[tokio::test]
    async fn test_prepare_buy_sends_query_and_client_id() {
        let (url, recorded) = serve_json_once(json!({
            "data": {
                "originAmount": "41000000000000000",
                "destinationAmount": "100000000",
                "steps": [{"transactions": [{"chainId": 1, "to": "0x2222222222222222222222222222222222222222", "data": "0x"}]}]
            }
        }))
        .await;

        let provider = HttpQuoteProvider::new(&format!("{}/", url), Some("test-client"), Duration::from_secs(5))
            .expect("provider");
        let quote = provider.prepare_buy(&request()).await.expect("quote");
        assert!(quote.is_executable());
        assert_eq!(quote.to_amount.as_deref(), Some("100000000"));

        let recorded = recorded.await.expect("request");
        let request_line = recorded.head.lines().next().unwrap_or_default().to_string();
        assert!(request_line.starts_with("GET /v1/buy/prepare?"));
        assert!(request_line.contains("originChainId=1"));
        assert!(request_line.contains("destinationChainId=137"));
        assert!(request_line.contains("amount=100000000"));
        assert!(recorded.head.to_lowercase().contains("x-client-id: test-client"));
    }

    #[tokio::test]
    async fn test_http_error_is_quote_error() {
        let (url, _recorded) = serve_once(500, json!({"error": "unavailable"})).await;
        let provider = HttpQuoteProvider::new(&url, None, Duration::from_secs(5)).expect("provider");
        let err = provider.prepare_buy(&request()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Quote(_)));
    }
}
