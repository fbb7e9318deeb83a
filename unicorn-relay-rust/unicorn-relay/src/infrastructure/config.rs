use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Process-level settings of the relay; bridge settings live in `BridgeConfig`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_dir: String,
    pub enable_file_logs: bool,
    /// Try the wallet once at startup
    pub auto_connect: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            enable_file_logs: false,
            auto_connect: true,
        }
    }
}

impl RelayConfig {
    pub fn new() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            environment: env::var("RUST_ENV").unwrap_or(defaults.environment),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: u16::from_str(&env::var("PORT").unwrap_or_else(|_| defaults.port.to_string()))
                .map_err(|e| anyhow!("Invalid PORT: {e}"))?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level).to_lowercase(),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            enable_file_logs: parse_flag(env::var("ENABLE_FILE_LOGS").ok().as_deref(), defaults.enable_file_logs)?,
            auto_connect: parse_flag(env::var("AUTO_CONNECT").ok().as_deref(), defaults.auto_connect)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("PORT must be non-zero".to_string());
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!("LOG_LEVEL must be one of {}", LOG_LEVELS.join(", ")));
        }
        if self.enable_file_logs && self.log_dir.trim().is_empty() {
            errors.push("LOG_DIR is required when file logs are enabled".to_string());
        }

        errors
    }

    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.environment,
            "host": self.host,
            "port": self.port,
            "log_level": self.log_level,
            "file_logs": self.enable_file_logs,
            "auto_connect": self.auto_connect,
        })
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(anyhow!("Invalid boolean flag: {other}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RelayConfig::default();
        assert!(config.validate().is_empty());
        assert!(!config.is_production());
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = RelayConfig {
            port: 0,
            log_level: "loud".to_string(),
            log_dir: " ".to_string(),
            enable_file_logs: true,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 3);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("TRUE"), false).expect("flag"));
        assert!(!parse_flag(Some("0"), true).expect("flag"));
        assert!(parse_flag(None, true).expect("flag"));
        assert!(parse_flag(Some("maybe"), true).is_err());
    }
}
