//! Constants for the bridge core
//!
//! This module contains all constants used throughout the bridge core.

// Chain ids
pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const POLYGON_CHAIN_ID: u64 = 137;
pub const BASE_CHAIN_ID: u64 = 8453;

/// Sentinel token address used by the bridge API for the chain's native currency
pub const NATIVE_TOKEN_ADDRESS: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

// Token contracts
pub const USDC_ETHEREUM: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const PYUSD_ETHEREUM: &str = "0x6c3ea9036406852006290770bedfcaba0e23a0e8";
pub const USDC_POLYGON: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
pub const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

// Default RPC endpoints
pub const ETHEREUM_RPC_URL: &str = "https://eth.llamarpc.com";
pub const POLYGON_RPC_URL: &str = "https://polygon-rpc.com";
pub const BASE_RPC_URL: &str = "https://mainnet.base.org";

// Bridge quote API
pub const DEFAULT_QUOTE_API_URL: &str = "https://bridge.thirdweb.com";
pub const QUOTE_PREPARE_PATH: &str = "/v1/buy/prepare";
pub const CLIENT_ID_HEADER: &str = "x-client-id";

// Formatting
pub const DISPLAY_DECIMALS: u32 = 6;
/// Scale used when comparing amounts of unrelated tokens numerically
pub const COMPARISON_DECIMALS: u32 = 18;

// Sufficiency heuristic, in basis points of the target amount
pub const BASIS_POINTS: u64 = 10_000;
pub const CROSS_CHAIN_MULTIPLIER_BPS: u64 = 15_000;
pub const SAME_CHAIN_MULTIPLIER_BPS: u64 = 11_000;

// Timeouts and pacing
pub const AUTO_CONNECT_TIMEOUT_MS: u64 = 3_000;
pub const SIMULATED_STEP_DELAY_MS: u64 = 1_000;
pub const HTTP_TIMEOUT_MS: u64 = 30_000;

// ERC20
/// `transfer(address,uint256)`
pub const ERC20_TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

// Persisted UX state keys
pub const KEY_UNICORN_CONNECTED: &str = "unicorn_connected";
pub const KEY_LAST_WALLET_CONNECTION: &str = "last_wallet_connection";
pub const KEY_CONNECTION_TIME: &str = "unicorn_connection_time";
pub const KEY_ENV_DETECTED: &str = "unicorn_env_detected";
pub const KEY_DETECTION_METHOD: &str = "unicorn_detection_method";
pub const KEY_TX_PREFERENCES: &str = "tx_preferences";
pub const KEY_TX_HISTORY: &str = "tx_history";
pub const WALLET_CONNECTION_UNICORN: &str = "unicorn";

pub const CONNECTION_HINT_MAX_AGE_DAYS: i64 = 7;
pub const HISTORY_MEMORY_LIMIT: usize = 100;
pub const HISTORY_PERSIST_LIMIT: usize = 50;

// Validation
pub const ADDRESS_LENGTH: usize = 42; // 0x + 40 hex chars

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_selector_matches_signature() {
        let hash = ethers::utils::id("transfer(address,uint256)");
        assert_eq!(&hash[..4], &ERC20_TRANSFER_SELECTOR);
    }

    #[test]
    fn test_multipliers() {
        assert!(CROSS_CHAIN_MULTIPLIER_BPS > SAME_CHAIN_MULTIPLIER_BPS);
        assert!(SAME_CHAIN_MULTIPLIER_BPS > BASIS_POINTS);
    }

    #[test]
    fn test_addresses_are_well_formed() {
        for addr in [NATIVE_TOKEN_ADDRESS, USDC_ETHEREUM, PYUSD_ETHEREUM, USDC_POLYGON, USDC_BASE] {
            assert_eq!(addr.len(), ADDRESS_LENGTH);
            assert!(addr.starts_with("0x"));
        }
    }
}
