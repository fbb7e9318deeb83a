//! Balance scanning
//!
//! Walks the configured chain table in order and reads every token balance of
//! the connected account, one call at a time.

use std::sync::Arc;
use crate::domain::entities::{ChainDescriptor, UserBalance};
use crate::domain::repositories::BalanceReader;
use crate::shared::error::BridgeError;
use crate::shared::utils::{is_positive_amount, short_address};

pub struct BalanceScanner {
    chains: Vec<ChainDescriptor>,
    reader: Arc<dyn BalanceReader>,
}

impl BalanceScanner {
    pub fn new(chains: Vec<ChainDescriptor>, reader: Arc<dyn BalanceReader>) -> Self {
        Self { chains, reader }
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    /// Non-zero balances in chain order, then token order.
    ///
    /// A failed read for one token is logged and treated as no balance.
    pub async fn scan(&self, account: Option<&str>) -> Result<Vec<UserBalance>, BridgeError> {
        let account = account.ok_or_else(|| BridgeError::no_account("No connected account to scan"))?;
        log::info!("Scanning balances for {}", short_address(account));

        let mut balances = Vec::new();
        for chain in &self.chains {
            for token in &chain.tokens {
                let raw = match self.reader.balance_of(chain, token, account).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        log::warn!("Skipping {} on {}: {}", token.symbol, chain.name, e);
                        continue;
                    }
                };

                let balance = UserBalance::new(chain, token, raw);
                if !is_positive_amount(&balance.formatted_balance) {
                    log::debug!("No {} on {}", token.symbol, chain.name);
                    continue;
                }
                log::debug!("{} {} on {}", balance.formatted_balance, token.symbol, chain.name);
                balances.push(balance);
            }
        }

        log::info!("Scan found {} non-zero balances", balances.len());
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::default_chains;
    use crate::shared::constants::{NATIVE_TOKEN_ADDRESS, POLYGON_CHAIN_ID, USDC_BASE, USDC_ETHEREUM};
    use crate::test_utils::{StaticBalanceReader, TEST_ACCOUNT};
    use ethers::types::U256;

    fn reader() -> StaticBalanceReader {
        StaticBalanceReader::new()
            .with_balance(USDC_BASE, 8453, U256::from(10_000_000u64))
            .with_balance(NATIVE_TOKEN_ADDRESS, POLYGON_CHAIN_ID, U256::exp10(18) * 5)
            .with_balance(NATIVE_TOKEN_ADDRESS, 1, U256::exp10(17) * 5)
            // Rounds to 0.000000
            .with_balance(USDC_ETHEREUM, 1, U256::zero())
    }

    #[tokio::test]
    async fn test_scan_keeps_config_order_and_skips_zero() {
        let scanner = BalanceScanner::new(default_chains(), Arc::new(reader()));
        let balances = scanner.scan(Some(TEST_ACCOUNT)).await.expect("scan");

        let found: Vec<(&str, &str)> = balances
            .iter()
            .map(|b| (b.chain_name.as_str(), b.token_symbol.as_str()))
            .collect();
        assert_eq!(found, vec![("Ethereum", "ETH"), ("Polygon", "POL"), ("Base", "USDC")]);
        assert_eq!(balances[0].formatted_balance, "0.500000");
        assert_eq!(balances[1].formatted_balance, "5.000000");
    }

    #[tokio::test]
    async fn test_scan_skips_dust_that_rounds_to_zero() {
        let reader = StaticBalanceReader::new().with_balance(NATIVE_TOKEN_ADDRESS, 1, U256::from(10u64).pow(U256::from(11u64)));
        let scanner = BalanceScanner::new(default_chains(), Arc::new(reader));
        let balances = scanner.scan(Some(TEST_ACCOUNT)).await.expect("scan");
        assert!(balances.is_empty());
    }

    #[tokio::test]
    async fn test_scan_skips_failed_reads() {
        let reader = reader().failing_on(USDC_BASE, 8453);
        let scanner = BalanceScanner::new(default_chains(), Arc::new(reader));
        let balances = scanner.scan(Some(TEST_ACCOUNT)).await.expect("scan");
        assert_eq!(balances.len(), 2);
        assert!(balances.iter().all(|b| b.token_address != USDC_BASE));
    }

    #[tokio::test]
    async fn test_scan_without_account_fails() {
        let scanner = BalanceScanner::new(default_chains(), Arc::new(reader()));
        let err = scanner.scan(None).await.unwrap_err();
        assert!(matches!(err, BridgeError::NoAccount(_)));
    }

    #[tokio::test]
    async fn test_scan_is_idempotent() {
        let scanner = BalanceScanner::new(default_chains(), Arc::new(reader()));
        let first = scanner.scan(Some(TEST_ACCOUNT)).await.expect("scan");
        let second = scanner.scan(Some(TEST_ACCOUNT)).await.expect("scan");
        assert_eq!(first, second);
    }
}
