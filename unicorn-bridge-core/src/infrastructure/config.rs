//! Bridge configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! config file, then `UNICORN__*` environment variables. Per-chain RPC
//! endpoints can also be overridden with `UNICORN_RPC_<CHAIN_NAME>`.

use std::collections::HashSet;
use std::env;
use std::time::Duration;
use config::{Config, Environment, File};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use crate::core::router::SufficiencyPolicy;
use crate::domain::entities::{default_chains, ChainDescriptor};
use crate::shared::constants::*;
use crate::shared::error::BridgeError;
use crate::shared::utils::{is_native_token, validate_ethereum_address};

pub const CONFIG_FILE_ENV: &str = "UNICORN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "unicorn.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub chains: Vec<ChainDescriptor>,
    pub quote_api_url: String,
    pub client_id: Option<String>,
    pub request_timeout_ms: u64,
    pub simulated_step_delay_ms: u64,
    pub auto_connect_timeout_ms: u64,
    pub cross_chain_multiplier_bps: u64,
    pub same_chain_multiplier_bps: u64,
    /// Directory of the persisted key/value store
    pub storage_dir: String,
    /// Fixed account for read-only sessions
    pub account: Option<String>,
    /// Hex signing key enabling real execution
    pub private_key: Option<String>,
    /// Answer of the approval gate for transactions that need confirmation
    pub auto_approve: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            quote_api_url: DEFAULT_QUOTE_API_URL.to_string(),
            client_id: None,
            request_timeout_ms: HTTP_TIMEOUT_MS,
            simulated_step_delay_ms: SIMULATED_STEP_DELAY_MS,
            auto_connect_timeout_ms: AUTO_CONNECT_TIMEOUT_MS,
            cross_chain_multiplier_bps: CROSS_CHAIN_MULTIPLIER_BPS,
            same_chain_multiplier_bps: SAME_CHAIN_MULTIPLIER_BPS,
            storage_dir: "./data/unicorn".to_string(),
            account: None,
            private_key: None,
            auto_approve: false,
        }
    }
}

impl BridgeConfig {
    /// Load from `.env`, `$UNICORN_CONFIG` (default `unicorn.toml`) and the environment
    pub fn load() -> Result<Self, BridgeError> {
        dotenv().ok();
        let path = env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_file(Some(&path))
    }

    /// Defaults, then `path` if it exists, then environment overrides
    pub fn from_file(path: Option<&str>) -> Result<Self, BridgeError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("UNICORN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_rpc_overrides();
        Ok(config)
    }

    /// `UNICORN_RPC_<CHAIN_NAME>` replaces that chain's endpoint
    pub fn apply_rpc_overrides(&mut self) {
        for chain in &mut self.chains {
            if let Ok(url) = env::var(chain.rpc_env_key()) {
                if !url.trim().is_empty() {
                    log::debug!("RPC override for {}", chain.name);
                    chain.rpc_url = url.trim().to_string();
                }
            }
        }
    }

    /// Every problem found; empty when the configuration is usable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.chains.is_empty() {
            errors.push("At least one chain must be configured".to_string());
        }
        let mut ids = HashSet::new();
        for chain in &self.chains {
            if !ids.insert(chain.id) {
                errors.push(format!("Duplicate chain id {}", chain.id));
            }
            if chain.rpc_url.trim().is_empty() {
                errors.push(format!("{} has no RPC URL ({})", chain.name, chain.rpc_env_key()));
            }
            if chain.tokens.is_empty() {
                errors.push(format!("{} has no tokens", chain.name));
            }
            for token in &chain.tokens {
                if !is_native_token(&token.address) && validate_ethereum_address(&token.address).is_err() {
                    errors.push(format!("{} on {} has an invalid address", token.symbol, chain.name));
                }
                if token.decimals > 36 {
                    errors.push(format!("{} on {} has unsupported decimals", token.symbol, chain.name));
                }
            }
        }

        if !self.quote_api_url.starts_with("http://") && !self.quote_api_url.starts_with("https://") {
            errors.push("quote_api_url must be an http(s) URL".to_string());
        }
        if self.request_timeout_ms == 0 {
            errors.push("request_timeout_ms must be positive".to_string());
        }
        if self.auto_connect_timeout_ms == 0 {
            errors.push("auto_connect_timeout_ms must be positive".to_string());
        }
        if self.cross_chain_multiplier_bps < BASIS_POINTS || self.same_chain_multiplier_bps < BASIS_POINTS {
            errors.push("Sufficiency multipliers must be at least 10000 bps".to_string());
        }
        if self.storage_dir.trim().is_empty() {
            errors.push("storage_dir cannot be empty".to_string());
        }
        if let Some(account) = &self.account {
            if validate_ethereum_address(account).is_err() {
                errors.push("account is not a valid address".to_string());
            }
        }

        errors
    }

    pub fn policy(&self) -> SufficiencyPolicy {
        SufficiencyPolicy {
            cross_chain_bps: self.cross_chain_multiplier_bps,
            same_chain_bps: self.same_chain_multiplier_bps,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_step_delay_ms)
    }

    pub fn auto_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.auto_connect_timeout_ms)
    }

    /// Summary safe to print or log (no key material)
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "chains": self.chains.iter().map(|c| serde_json::json!({
                "id": c.id,
                "name": c.name,
                "rpc_url": c.rpc_url,
                "tokens": c.tokens.iter().map(|t| t.symbol.clone()).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
            "quote_api_url": self.quote_api_url,
            "client_id_set": self.client_id.is_some(),
            "request_timeout_ms": self.request_timeout_ms,
            "simulated_step_delay_ms": self.simulated_step_delay_ms,
            "auto_connect_timeout_ms": self.auto_connect_timeout_ms,
            "cross_chain_multiplier_bps": self.cross_chain_multiplier_bps,
            "same_chain_multiplier_bps": self.same_chain_multiplier_bps,
            "storage_dir": self.storage_dir,
            "account": self.account,
            "signer_configured": self.private_key.is_some(),
            "auto_approve": self.auto_approve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = BridgeConfig::default();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.chains.len(), 3);
        assert_eq!(config.policy(), SufficiencyPolicy::default());
        assert_eq!(config.auto_connect_timeout(), Duration::from_millis(3_000));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().expect("tempfile");
        writeln!(
            file,
            r#"
quote_api_url = "https://quotes.example.com"
cross_chain_multiplier_bps = 12000
simulated_step_delay_ms = 0

[[chains]]
id = 137
name = "Polygon"
native_symbol = "POL"
rpc_url = "https://polygon.example.com"

[[chains.tokens]]
address = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE"
symbol = "POL"
decimals = 18
"#
        )
        .expect("write");

        let path = file.path().to_string_lossy().to_string();
        let config = BridgeConfig::from_file(Some(&path)).expect("config");
        assert_eq!(config.quote_api_url, "https://quotes.example.com");
        assert_eq!(config.policy().cross_chain_bps, 12_000);
        assert_eq!(config.policy().same_chain_bps, SAME_CHAIN_MULTIPLIER_BPS);
        assert_eq!(config.chains.len(), 1);
        assert_eq!(config.chains[0].tokens[0].symbol, "POL");
        assert_eq!(config.step_delay(), Duration::ZERO);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = BridgeConfig::from_file(Some("/nonexistent/unicorn")).expect("config");
        assert_eq!(config.quote_api_url, DEFAULT_QUOTE_API_URL);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = BridgeConfig::default();
        config.chains[1].id = 1;
        config.chains[2].rpc_url.clear();
        config.quote_api_url = "ftp://nope".to_string();
        config.same_chain_multiplier_bps = 9_000;
        config.account = Some("0x123".to_string());

        let errors = config.validate();
        assert_eq!(errors.len(), 5, "{:?}", errors);
    }

    #[test]
    fn test_summary_hides_key() {
        let config = BridgeConfig {
            private_key: Some("0xdeadbeef".to_string()),
            ..Default::default()
        };
        let summary = config.summary().to_string();
        assert!(!summary.contains("deadbeef"));
        assert!(summary.contains("\"signer_configured\":true"));
    }
}
