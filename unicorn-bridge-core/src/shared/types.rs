use serde::{Deserialize, Serialize};

// Basic types for bridge operations
pub type Address = String;
pub type TransactionHash = String;
pub type ChainId = u64;
/// Human-readable decimal amount, e.g. "2.5"
pub type Amount = String;
/// Integer amount in token base units, e.g. "2500000"
pub type BaseUnits = String;

/// An opaque, externally prepared transaction.
///
/// Quote responses carry extra fields (gas hints, `type`, `id`...) which are
/// kept in `extra` and passed back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDescriptor {
    pub chain_id: ChainId,
    pub to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<BaseUnits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TransactionDescriptor {
    pub fn new(chain_id: ChainId, to: impl Into<Address>) -> Self {
        Self {
            chain_id,
            to: to.into(),
            value: None,
            data: None,
            action: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<BaseUnits>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// True when the transaction moves no native value
    pub fn is_zero_value(&self) -> bool {
        match self.value.as_deref() {
            None => true,
            Some(v) => {
                let v = v.trim();
                let digits = v.strip_prefix("0x").unwrap_or(v);
                digits.is_empty() || digits.chars().all(|c| c == '0')
            }
        }
    }
}

/// How the executor should dispatch a route
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Simulate,
    Real,
}

// Result type for bridge operations
pub type BridgeResult<T> = Result<T, crate::shared::error::BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "chainId": 137,
            "to": "0x1111111111111111111111111111111111111111",
            "data": "0xdeadbeef",
            "value": "0",
            "type": "eip1559",
            "gas": "0x5208"
        });
        let tx: TransactionDescriptor = serde_json::from_value(raw).expect("descriptor");
        assert_eq!(tx.chain_id, 137);
        assert_eq!(tx.extra.get("type").and_then(|v| v.as_str()), Some("eip1559"));

        let back = serde_json::to_value(&tx).expect("serialize");
        assert_eq!(back["gas"], "0x5208");
    }

    #[test]
    fn test_zero_value_detection() {
        let base = TransactionDescriptor::new(1, "0x1111111111111111111111111111111111111111");
        assert!(base.is_zero_value());
        assert!(base.clone().with_value("0").is_zero_value());
        assert!(base.clone().with_value("0x0").is_zero_value());
        assert!(!base.with_value("1000").is_zero_value());
    }

    #[test]
    fn test_execution_mode_default() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Simulate);
        let mode: ExecutionMode = serde_json::from_str("\"real\"").expect("mode");
        assert_eq!(mode, ExecutionMode::Real);
    }
}
