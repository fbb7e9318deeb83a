//! Wallet-side adapters: account providers and the ethers transaction sender

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address as EthAddress, Bytes, TransactionRequest};
use crate::domain::entities::ChainDescriptor;
use crate::domain::repositories::{AccountProvider, TransactionSender};
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, TransactionDescriptor, TransactionHash};
use crate::shared::utils::{parse_base_units, validate_ethereum_address};

/// Account supplied up front, e.g. from configuration or a request body
pub struct StaticAccountProvider {
    address: Address,
}

impl StaticAccountProvider {
    pub fn new(address: &str) -> Result<Self, BridgeError> {
        validate_ethereum_address(address)?;
        Ok(Self {
            address: address.to_string(),
        })
    }
}

#[async_trait]
impl AccountProvider for StaticAccountProvider {
    async fn connect(&self) -> Result<Address, BridgeError> {
        Ok(self.address.clone())
    }
}

/// Provider for sessions without a wallet; connecting always fails
pub struct NoWallet;

#[async_trait]
impl AccountProvider for NoWallet {
    async fn connect(&self) -> Result<Address, BridgeError> {
        Err(BridgeError::no_account("No wallet configured"))
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[async_trait]
impl TransactionSender for NoWallet {
    async fn send_transaction(&self, _transaction: &TransactionDescriptor) -> Result<TransactionHash, BridgeError> {
        Err(BridgeError::no_account("No wallet configured to sign transactions"))
    }
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signs with a local key and waits for each receipt before returning
pub struct EthersTransactionSender {
    wallet: LocalWallet,
    clients: HashMap<u64, Arc<SignerClient>>,
}

impl EthersTransactionSender {
    pub fn new(private_key: &str, chains: &[ChainDescriptor]) -> Result<Self, BridgeError> {
        let wallet: LocalWallet = private_key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|e| BridgeError::config(format!("Invalid signing key: {}", e)))?;

        let mut clients = HashMap::new();
        for chain in chains {
            let provider = Provider::<Http>::try_from(chain.rpc_url.as_str()).map_err(|e| {
                BridgeError::config(format!("Failed to create HTTP provider for {}: {}", chain.name, e))
            })?;
            let signer = wallet.clone().with_chain_id(chain.id);
            clients.insert(chain.id, Arc::new(SignerMiddleware::new(provider, signer)));
        }

        Ok(Self { wallet, clients })
    }

    pub fn address(&self) -> Address {
        format!("{:?}", self.wallet.address())
    }

    fn client(&self, chain_id: u64) -> Result<&Arc<SignerClient>, BridgeError> {
        self.clients
            .get(&chain_id)
            .ok_or_else(|| BridgeError::config(format!("Chain {} is not configured", chain_id)))
    }
}

/// Convert a descriptor into an ethers request
pub fn to_request(transaction: &TransactionDescriptor) -> Result<TransactionRequest, BridgeError> {
    let to: EthAddress = transaction
        .to
        .parse()
        .map_err(|e| BridgeError::validation(format!("Invalid recipient {}: {}", transaction.to, e)))?;
    let mut request = TransactionRequest::new().to(to).chain_id(transaction.chain_id);

    if let Some(value) = transaction.value.as_deref() {
        request = request.value(parse_base_units(value)?);
    }
    if let Some(data) = transaction.data.as_deref() {
        let bytes = hex::decode(data.trim_start_matches("0x"))?;
        if !bytes.is_empty() {
            request = request.data(Bytes::from(bytes));
        }
    }
    Ok(request)
}

#[async_trait]
impl AccountProvider for EthersTransactionSender {
    async fn connect(&self) -> Result<Address, BridgeError> {
        Ok(self.address())
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[async_trait]
impl TransactionSender for EthersTransactionSender {
    async fn send_transaction(&self, transaction: &TransactionDescriptor) -> Result<TransactionHash, BridgeError> {
        let client = self.client(transaction.chain_id)?;
        let request = to_request(transaction)?;

        let pending = client
            .send_transaction(request, None)
            .await
            .map_err(|e| BridgeError::transaction(format!("Failed to send transaction: {}", e)))?;
        let hash = format!("{:?}", pending.tx_hash());
        log::info!("Sent {} on chain {}, waiting for receipt", hash, transaction.chain_id);

        let receipt = pending
            .await
            .map_err(|e| BridgeError::transaction(format!("Failed waiting for {}: {}", hash, e)))?
            .ok_or_else(|| BridgeError::transaction(format!("Transaction {} was dropped", hash)))?;

        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            return Err(BridgeError::transaction(format!("Transaction {} reverted", hash)));
        }
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::default_chains;
    use crate::test_utils::TEST_ACCOUNT;

    // Well-known development key (anvil account 0)
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_static_account_provider() {
        let provider = StaticAccountProvider::new(TEST_ACCOUNT).expect("provider");
        assert_eq!(provider.connect().await.expect("connect"), TEST_ACCOUNT);
        assert!(StaticAccountProvider::new("0x12").is_err());
        assert!(NoWallet.connect().await.is_err());
    }

    #[test]
    fn test_sender_derives_address() {
        let sender = EthersTransactionSender::new(DEV_KEY, &default_chains()).expect("sender");
        assert_eq!(sender.address(), "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert!(sender.client(137).is_ok());
        assert!(sender.client(10).is_err());
        assert!(EthersTransactionSender::new("nope", &default_chains()).is_err());
    }

    #[test]
    fn test_to_request() {
        let tx = TransactionDescriptor::new(137, TEST_ACCOUNT)
            .with_value("0x10")
            .with_data("0xa9059cbb");
        let request = to_request(&tx).expect("request");
        assert_eq!(request.value, Some(16u64.into()));
        assert_eq!(request.data.map(|d| d.to_vec()), Some(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert_eq!(request.chain_id.map(|c| c.as_u64()), Some(137));

        let empty = to_request(&TransactionDescriptor::new(1, TEST_ACCOUNT).with_data("0x")).expect("request");
        assert!(empty.data.is_none());
        assert!(to_request(&TransactionDescriptor::new(1, "0xzz")).is_err());
    }
}
