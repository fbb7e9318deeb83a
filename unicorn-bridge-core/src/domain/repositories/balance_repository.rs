//! Balance repository for on-chain reads

use async_trait::async_trait;
use ethers::types::U256;
use crate::domain::entities::chain::{ChainDescriptor, TokenDescriptor};
use crate::shared::error::BridgeError;

/// Read-only access to account balances
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Native balance in wei
    async fn native_balance(&self, chain: &ChainDescriptor, owner: &str) -> Result<U256, BridgeError>;

    /// ERC20 `balanceOf(owner)` in token base units
    async fn token_balance(
        &self,
        chain: &ChainDescriptor,
        token: &TokenDescriptor,
        owner: &str,
    ) -> Result<U256, BridgeError>;

    /// Dispatch on the native sentinel
    async fn balance_of(
        &self,
        chain: &ChainDescriptor,
        token: &TokenDescriptor,
        owner: &str,
    ) -> Result<U256, BridgeError> {
        if token.is_native() {
            self.native_balance(chain, owner).await
        } else {
            self.token_balance(chain, token, owner).await
        }
    }
}
