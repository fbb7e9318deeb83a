//! Bridge quote entities
//!
//! A quote is an externally computed plan: an ordered list of steps, each an
//! ordered list of transactions. The core only inspects the step structure
//! and the optional quote-level amounts; everything else is carried through.

use serde::{Deserialize, Deserializer, Serialize};
use ethers::types::U256;
use crate::shared::types::{Address, BaseUnits, ChainId, TransactionDescriptor};
use crate::shared::utils::parse_base_units;

/// Parameters of a "prepare buy" call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub origin_chain_id: ChainId,
    pub origin_token_address: Address,
    pub destination_chain_id: ChainId,
    pub destination_token_address: Address,
    /// Destination token base units
    pub amount: BaseUnits,
    pub sender: Address,
    pub receiver: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteStep {
    #[serde(default)]
    pub transactions: Vec<TransactionDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BridgeQuote {
    #[serde(default)]
    pub steps: Vec<QuoteStep>,
    /// Source-token cost in base units
    #[serde(default, alias = "originAmount", deserialize_with = "amount_string", skip_serializing_if = "Option::is_none")]
    pub from_amount: Option<BaseUnits>,
    /// Destination-token amount in base units
    #[serde(default, alias = "destinationAmount", deserialize_with = "amount_string", skip_serializing_if = "Option::is_none")]
    pub to_amount: Option<BaseUnits>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BridgeQuote {
    /// At least one step, and every step carries at least one transaction
    pub fn is_executable(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| !s.transactions.is_empty())
    }

    pub fn transaction_count(&self) -> usize {
        self.steps.iter().map(|s| s.transactions.len()).sum()
    }

    pub fn from_amount_units(&self) -> Option<U256> {
        self.from_amount.as_deref().and_then(|a| parse_base_units(a).ok())
    }

    pub fn to_amount_units(&self) -> Option<U256> {
        self.to_amount.as_deref().and_then(|a| parse_base_units(a).ok())
    }
}

// Amounts arrive as strings from most endpoints and as numbers from some.
fn amount_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
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

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_json() -> serde_json::Value {
        serde_json::json!({
            "chainId": 1,
            "to": "0x2222222222222222222222222222222222222222",
            "data": "0x",
            "value": "1000",
            "action": "approval"
        })
    }

    #[test]
    fn test_parse_quote_with_origin_aliases() {
        let raw = serde_json::json!({
            "originAmount": "500000000000000000",
            "destinationAmount": 100000000u64,
            "intentId": "abc",
            "steps": [{ "transactions": [tx_json(), tx_json()] }, { "transactions": [tx_json()] }]
        });
        let quote: BridgeQuote = serde_json::from_value(raw).expect("quote");

        assert!(quote.is_executable());
        assert_eq!(quote.transaction_count(), 3);
        assert_eq!(quote.from_amount.as_deref(), Some("500000000000000000"));
        assert_eq!(quote.to_amount_units(), Some(U256::from(100_000_000u64)));
        assert_eq!(quote.extra.get("intentId").and_then(|v| v.as_str()), Some("abc"));
        assert_eq!(quote.steps[0].transactions[0].action.as_deref(), Some("approval"));
    }

    #[test]
    fn test_empty_steps_not_executable() {
        let quote: BridgeQuote = serde_json::from_value(serde_json::json!({ "steps": [] })).expect("quote");
        assert!(!quote.is_executable());

        let quote: BridgeQuote = serde_json::from_value(serde_json::json!({
            "steps": [{ "transactions": [tx_json()] }, { "transactions": [] }]
        }))
        .expect("quote");
        assert!(!quote.is_executable());
        assert!(quote.from_amount_units().is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = QuoteRequest {
            origin_chain_id: 1,
            origin_token_address: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string(),
            destination_chain_id: 137,
            destination_token_address: "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174".to_string(),
            amount: "100000000".to_string(),
            sender: "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6".to_string(),
            receiver: "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["originChainId"], 1);
        assert_eq!(value["destinationTokenAddress"], "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
    }
}
