//! Wallet repository: the embedded smart account boundary

use async_trait::async_trait;
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, TransactionDescriptor, TransactionHash};

/// Yields the active account of a connected wallet
#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn connect(&self) -> Result<Address, BridgeError>;

    /// Human-readable name for logs and connection hints
    fn name(&self) -> &str {
        "unicorn"
    }
}

/// Submits a prepared transaction and returns its hash.
///
/// Implementations return only once the transaction is settled enough for the
/// next one in a sequence to be sent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSender: Send + Sync {
    async fn send_transaction(&self, transaction: &TransactionDescriptor) -> Result<TransactionHash, BridgeError>;
}
