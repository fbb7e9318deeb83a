//! Chain and token entities for the bridge core

use serde::{Deserialize, Serialize};
use crate::shared::constants::*;
use crate::shared::types::{Address, ChainId};
use crate::shared::utils::{addresses_equal, is_native_token};

/// A token held on a configured chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub address: Address,
    pub symbol: String,
    pub decimals: u32,
}

impl TokenDescriptor {
    pub fn new(address: impl Into<Address>, symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }

    pub fn native(symbol: impl Into<String>) -> Self {
        Self::new(NATIVE_TOKEN_ADDRESS, symbol, 18)
    }

    pub fn is_native(&self) -> bool {
        is_native_token(&self.address)
    }
}

/// A supported chain and the tokens scanned on it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub id: ChainId,
    pub name: String,
    pub native_symbol: String,
    pub rpc_url: String,
    #[serde(default)]
    pub tokens: Vec<TokenDescriptor>,
}

impl ChainDescriptor {
    pub fn token_by_symbol(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn token_by_address(&self, address: &str) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| addresses_equal(&t.address, address))
    }

    /// Environment variable that overrides this chain's RPC endpoint
    pub fn rpc_env_key(&self) -> String {
        let name: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("UNICORN_RPC_{}", name)
    }
}

/// Built-in chain table: Ethereum, Polygon, Base (in scan order)
pub fn default_chains() -> Vec<ChainDescriptor> {
    vec![
        ChainDescriptor {
            id: ETHEREUM_CHAIN_ID,
            name: "Ethereum".to_string(),
            native_symbol: "ETH".to_string(),
            rpc_url: ETHEREUM_RPC_URL.to_string(),
            tokens: vec![
                TokenDescriptor::native("ETH"),
                TokenDescriptor::new(USDC_ETHEREUM, "USDC", 6),
                TokenDescriptor::new(PYUSD_ETHEREUM, "PYUSD", 6),
            ],
        },
        ChainDescriptor {
            id: POLYGON_CHAIN_ID,
            name: "Polygon".to_string(),
            native_symbol: "POL".to_string(),
            rpc_url: POLYGON_RPC_URL.to_string(),
            tokens: vec![
                TokenDescriptor::native("POL"),
                TokenDescriptor::new(USDC_POLYGON, "USDC", 6),
            ],
        },
        ChainDescriptor {
            id: BASE_CHAIN_ID,
            name: "Base".to_string(),
            native_symbol: "ETH".to_string(),
            rpc_url: BASE_RPC_URL.to_string(),
            tokens: vec![
                TokenDescriptor::native("ETH"),
                TokenDescriptor::new(USDC_BASE, "USDC", 6),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let chains = default_chains();
        let ids: Vec<u64> = chains.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID, BASE_CHAIN_ID]);
    }

    #[test]
    fn test_token_lookup() {
        let chains = default_chains();
        let polygon = &chains[1];
        assert!(polygon.token_by_symbol("pol").expect("POL").is_native());
        assert_eq!(polygon.token_by_symbol("USDC").expect("USDC").decimals, 6);
        assert!(polygon.token_by_address(&USDC_POLYGON.to_lowercase()).is_some());
        assert!(polygon.token_by_symbol("PYUSD").is_none());
    }

    #[test]
    fn test_rpc_env_key() {
        let chains = default_chains();
        assert_eq!(chains[0].rpc_env_key(), "UNICORN_RPC_ETHEREUM");
        let custom = ChainDescriptor {
            id: 42161,
            name: "Arbitrum One".to_string(),
            native_symbol: "ETH".to_string(),
            rpc_url: String::new(),
            tokens: vec![],
        };
        assert_eq!(custom.rpc_env_key(), "UNICORN_RPC_ARBITRUM_ONE");
    }
}
