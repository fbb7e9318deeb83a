//! Route entities: one candidate way of reaching the target from a balance

use serde::{Deserialize, Serialize};
use crate::domain::entities::quote::BridgeQuote;
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, Amount, ChainId};
use crate::shared::utils::addresses_equal;

/// Complexity tier, used for ranking and for picking the execution strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RouteComplexity {
    /// Same chain, same token: a single transfer
    Simple,
    /// Quoted bridge (possibly converting token on the way)
    Bridge,
    /// Bridge followed by a same-chain swap. The swap leg has no executor.
    Complex,
}

impl RouteComplexity {
    pub fn rank(&self) -> u8 {
        match self {
            RouteComplexity::Simple => 0,
            RouteComplexity::Bridge => 1,
            RouteComplexity::Complex => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteOption {
    pub from_chain: String,
    pub from_token: String,
    pub from_balance: Amount,
    pub to_chain: String,
    pub to_token: String,
    /// Target-token units
    pub estimated_output: Amount,
    /// Source-token units
    pub estimated_input: Option<Amount>,
    pub steps: Vec<String>,
    pub complexity: RouteComplexity,
    pub estimated: bool,
    pub from_chain_id: ChainId,
    pub to_chain_id: ChainId,
    pub from_token_address: Address,
    pub to_token_address: Address,
    pub from_token_decimals: u32,
    pub to_token_decimals: u32,
    pub bridge_quote: Option<BridgeQuote>,
    #[serde(default)]
    pub insufficient_funds: bool,
    pub required_amount: Option<Amount>,
}

impl RouteOption {
    pub fn is_same_chain(&self) -> bool {
        self.from_chain_id == self.to_chain_id
    }

    pub fn is_same_token(&self) -> bool {
        addresses_equal(&self.from_token_address, &self.to_token_address)
    }

    pub fn is_executable(&self) -> bool {
        !self.insufficient_funds
    }

    /// Check the structural invariants of the complexity tier
    pub fn validate(&self) -> Result<(), BridgeError> {
        match self.complexity {
            RouteComplexity::Simple => {
                if !self.is_same_chain() || !self.is_same_token() {
                    return Err(BridgeError::validation(
                        "Simple route must stay on one chain and one token",
                    ));
                }
            }
            RouteComplexity::Bridge => {
                if self.is_same_chain() && self.is_same_token() {
                    return Err(BridgeError::validation(
                        "Bridge route must change chain or token",
                    ));
                }
                if self.bridge_quote.is_none() {
                    return Err(BridgeError::validation("Bridge route is missing its quote"));
                }
            }
            RouteComplexity::Complex => {}
        }
        Ok(())
    }

    /// One-line description for status displays
    pub fn summary(&self) -> String {
        format!(
            "{} {} on {} -> {} {} on {}",
            self.from_balance, self.from_token, self.from_chain, self.estimated_output, self.to_token, self.to_chain
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn route(complexity: RouteComplexity, insufficient: bool) -> RouteOption {
        let (to_chain_id, to_token_address) = match complexity {
            RouteComplexity::Simple => (137, "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"),
            _ => (1, "0x6c3ea9036406852006290770bedfcaba0e23a0e8"),
        };
        RouteOption {
            from_chain: "Polygon".to_string(),
            from_token: "POL".to_string(),
            from_balance: "5.000000".to_string(),
            to_chain: if to_chain_id == 137 { "Polygon".to_string() } else { "Ethereum".to_string() },
            to_token: if to_chain_id == 137 { "POL".to_string() } else { "PYUSD".to_string() },
            estimated_output: "2.0".to_string(),
            estimated_input: None,
            steps: vec!["step".to_string()],
            complexity,
            estimated: false,
            from_chain_id: 137,
            to_chain_id,
            from_token_address: "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE".to_string(),
            to_token_address: to_token_address.to_string(),
            from_token_decimals: 18,
            to_token_decimals: if to_chain_id == 137 { 18 } else { 6 },
            bridge_quote: match complexity {
                RouteComplexity::Simple => None,
                _ => Some(BridgeQuote {
                    steps: vec![],
                    from_amount: None,
                    to_amount: None,
                    extra: serde_json::Map::new(),
                }),
            },
            insufficient_funds: insufficient,
            required_amount: None,
        }
    }
}
