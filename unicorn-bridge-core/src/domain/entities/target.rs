//! Route target and the symbol table that places it on a chain

use serde::{Deserialize, Serialize};
use crate::domain::entities::chain::{ChainDescriptor, TokenDescriptor};
use crate::shared::constants::{BASE_CHAIN_ID, ETHEREUM_CHAIN_ID, POLYGON_CHAIN_ID};
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, Amount, ChainId};
use crate::shared::utils::{is_positive_amount, parse_units, validate_ethereum_address};

/// What the user wants to end up with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouteTarget {
    /// Decimal amount in target-token units
    pub amount: Amount,
    pub token_symbol: String,
    /// Defaults to the connected account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
}

impl RouteTarget {
    pub fn new(amount: impl Into<Amount>, token_symbol: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            token_symbol: token_symbol.into(),
            recipient: None,
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<Address>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.token_symbol.trim().is_empty() {
            return Err(BridgeError::validation("Target token cannot be empty"));
        }
        // Any precision works for the shape check; 18 keeps every digit.
        parse_units(&self.amount, 18)?;
        if !is_positive_amount(&self.amount) {
            return Err(BridgeError::validation("Target amount must be greater than zero"));
        }
        if let Some(recipient) = &self.recipient {
            validate_ethereum_address(recipient)?;
        }
        Ok(())
    }

    pub fn recipient_or<'a>(&'a self, account: &'a str) -> &'a str {
        self.recipient.as_deref().unwrap_or(account)
    }
}

/// Target placed on a configured chain and token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub chain: ChainDescriptor,
    pub token: TokenDescriptor,
}

/// Map a target symbol to `(chain id, token symbol on that chain)`.
///
/// Unlisted symbols are looked up on Polygon under their own name.
pub fn target_location(symbol: &str) -> (ChainId, String) {
    match symbol.trim().to_ascii_uppercase().as_str() {
        "PYUSD" => (ETHEREUM_CHAIN_ID, "PYUSD".to_string()),
        "USDC-BASE" => (BASE_CHAIN_ID, "USDC".to_string()),
        "USDC-ETH" => (ETHEREUM_CHAIN_ID, "USDC".to_string()),
        other => (POLYGON_CHAIN_ID, other.to_string()),
    }
}

pub fn resolve_target(symbol: &str, chains: &[ChainDescriptor]) -> Result<ResolvedTarget, BridgeError> {
    let (chain_id, token_symbol) = target_location(symbol);
    let chain = chains
        .iter()
        .find(|c| c.id == chain_id)
        .ok_or_else(|| BridgeError::unknown_target(symbol))?;
    let token = chain
        .token_by_symbol(&token_symbol)
        .ok_or_else(|| BridgeError::unknown_target(symbol))?;

    Ok(ResolvedTarget {
        chain: chain.clone(),
        token: token.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::chain::default_chains;
    use crate::shared::constants::{PYUSD_ETHEREUM, USDC_BASE};

    #[test]
    fn test_target_table() {
        let chains = default_chains();

        let pyusd = resolve_target("PYUSD", &chains).expect("pyusd");
        assert_eq!(pyusd.chain.id, ETHEREUM_CHAIN_ID);
        assert_eq!(pyusd.token.address, PYUSD_ETHEREUM);

        let usdc_base = resolve_target("USDC-BASE", &chains).expect("usdc-base");
        assert_eq!(usdc_base.chain.id, BASE_CHAIN_ID);
        assert_eq!(usdc_base.token.address, USDC_BASE);

        let usdc_eth = resolve_target("USDC-ETH", &chains).expect("usdc-eth");
        assert_eq!(usdc_eth.chain.name, "Ethereum");
        assert_eq!(usdc_eth.token.symbol, "USDC");

        let pol = resolve_target("POL", &chains).expect("pol");
        assert_eq!(pol.chain.id, POLYGON_CHAIN_ID);
        assert!(pol.token.is_native());
    }

    #[test]
    fn test_unknown_target() {
        let chains = default_chains();
        let err = resolve_target("DOGE", &chains).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownTarget(_)));

        // Ethereum missing from the configured table
        let without_eth: Vec<_> = chains.into_iter().filter(|c| c.id != ETHEREUM_CHAIN_ID).collect();
        assert!(resolve_target("PYUSD", &without_eth).is_err());
    }

    #[test]
    fn test_target_validation() {
        assert!(RouteTarget::new("2", "PYUSD").validate().is_ok());
        assert!(RouteTarget::new("0", "PYUSD").validate().is_err());
        assert!(RouteTarget::new("abc", "PYUSD").validate().is_err());
        assert!(RouteTarget::new("1.5", "").validate().is_err());
        assert!(RouteTarget::new("1", "POL").with_recipient("0x1234").validate().is_err());
    }

    #[test]
    fn test_recipient_defaults_to_account() {
        let account = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";
        let target = RouteTarget::new("1", "POL");
        assert_eq!(target.recipient_or(account), account);

        let other = "0x2222222222222222222222222222222222222222";
        let target = target.with_recipient(other);
        assert_eq!(target.recipient_or(account), other);
    }
}
