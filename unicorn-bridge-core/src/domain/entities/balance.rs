//! Balance entity for the bridge core

use serde::{Deserialize, Serialize};
use ethers::types::U256;
use crate::domain::entities::chain::{ChainDescriptor, TokenDescriptor};
use crate::shared::constants::DISPLAY_DECIMALS;
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, ChainId};
use crate::shared::utils::{format_units_rounded, parse_base_units};

/// A non-zero holding found by a scan pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserBalance {
    pub chain_name: String,
    pub chain_id: ChainId,
    pub token_address: Address,
    pub token_symbol: String,
    /// Integer base units as a decimal string
    pub raw_balance: String,
    /// Rounded to six fractional digits
    pub formatted_balance: String,
    pub decimals: u32,
    pub is_native: bool,
}

impl UserBalance {
    pub fn new(chain: &ChainDescriptor, token: &TokenDescriptor, raw: U256) -> Self {
        Self {
            chain_name: chain.name.clone(),
            chain_id: chain.id,
            token_address: token.address.clone(),
            token_symbol: token.symbol.clone(),
            raw_balance: raw.to_string(),
            formatted_balance: format_units_rounded(raw, token.decimals, DISPLAY_DECIMALS),
            decimals: token.decimals,
            is_native: token.is_native(),
        }
    }

    pub fn raw_amount(&self) -> Result<U256, BridgeError> {
        parse_base_units(&self.raw_balance)
    }
}
