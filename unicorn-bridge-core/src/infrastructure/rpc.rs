//! Chain RPC access
//!
//! Native balances go through a raw `eth_getBalance` JSON-RPC call; token
//! balances through an ERC20 `balanceOf` contract call per chain provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use ethers::abi::Abi;
use ethers::contract::Contract;
use ethers::providers::{Http, Provider};
use ethers::types::{Address as EthAddress, U256};
use reqwest::Client;
use serde_json::json;
use crate::domain::entities::{ChainDescriptor, TokenDescriptor};
use crate::domain::repositories::BalanceReader;
use crate::shared::error::BridgeError;

const ERC20_BALANCE_ABI: &str = "function balanceOf(address owner) view returns (uint256)";

pub struct RpcBalanceReader {
    client: Client,
    providers: HashMap<u64, Arc<Provider<Http>>>,
    erc20: Abi,
}

impl RpcBalanceReader {
    pub fn new(chains: &[ChainDescriptor], timeout: Duration) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::config(format!("Failed to build HTTP client: {}", e)))?;

        let mut providers = HashMap::new();
        for chain in chains {
            let provider = Provider::<Http>::try_from(chain.rpc_url.as_str()).map_err(|e| {
                BridgeError::config(format!("Failed to create HTTP provider for {}: {}", chain.name, e))
            })?;
            providers.insert(chain.id, Arc::new(provider));
        }

        let erc20 = ethers::abi::parse_abi(&[ERC20_BALANCE_ABI])
            .map_err(|e| BridgeError::internal(format!("Invalid ERC20 ABI: {}", e)))?;

        Ok(Self {
            client,
            providers,
            erc20,
        })
    }

    async fn rpc_call(
        &self,
        url: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, BridgeError> {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::network(format!("{} failed: {}", method, e)))?;
        let resp_json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BridgeError::network(format!("Invalid response: {}", e)))?;

        if let Some(error) = resp_json.get("error") {
            return Err(BridgeError::network(format!("{} returned error: {}", method, error)));
        }
        resp_json
            .get("result")
            .cloned()
            .ok_or_else(|| BridgeError::network(format!("{} returned no result", method)))
    }

    fn provider(&self, chain: &ChainDescriptor) -> Result<Arc<Provider<Http>>, BridgeError> {
        self.providers
            .get(&chain.id)
            .cloned()
            .ok_or_else(|| BridgeError::config(format!("No provider configured for {}", chain.name)))
    }
}

/// Parse a JSON-RPC hex quantity ("0x1bc16d674ec80000")
pub fn parse_quantity(value: &serde_json::Value) -> Result<U256, BridgeError> {
    let raw = value
        .as_str()
        .ok_or_else(|| BridgeError::network(format!("Expected hex quantity, got {}", value)))?;
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| BridgeError::network(format!("Quantity without 0x prefix: {}", raw)))?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|e| BridgeError::network(format!("Invalid quantity {}: {}", raw, e)))
}

fn parse_address(address: &str) -> Result<EthAddress, BridgeError> {
    address
        .parse()
        .map_err(|e| BridgeError::validation(format!("Invalid address {}: {}", address, e)))
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn native_balance(&self, chain: &ChainDescriptor, owner: &str) -> Result<U256, BridgeError> {
        let result = self
            .rpc_call(&chain.rpc_url, "eth_getBalance", json!([owner, "latest"]))
            .await?;
        parse_quantity(&result)
    }

    async fn token_balance(
        &self,
        chain: &ChainDescriptor,
        token: &TokenDescriptor,
        owner: &str,
    ) -> Result<U256, BridgeError> {
        let contract = Contract::new(parse_address(&token.address)?, self.erc20.clone(), self.provider(chain)?);
        let call = contract
            .method::<_, U256>("balanceOf", parse_address(owner)?)
            .map_err(|e| BridgeError::internal(format!("Failed to encode balanceOf: {}", e)))?;
        call.call()
            .await
            .map_err(|e| BridgeError::network(format!("balanceOf {} on {} failed: {}", token.symbol, chain.name, e)))
    }
}
