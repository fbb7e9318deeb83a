//! Error handling for the bridge core
//!
//! This module defines the error types used throughout the bridge core.

use thiserror::Error;

/// Bridge error type
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No connected account: {0}")]
    NoAccount(String),

    #[error("Unknown target token: {0}")]
    UnknownTarget(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Quote error: {0}")]
    Quote(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Operation in progress: {0}")]
    Busy(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a missing-account error
    pub fn no_account(message: impl Into<String>) -> Self {
        Self::NoAccount(message.into())
    }

    /// Create an unmapped-target error
    pub fn unknown_target(symbol: impl Into<String>) -> Self {
        Self::UnknownTarget(symbol.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a quote error
    pub fn quote(message: impl Into<String>) -> Self {
        Self::Quote(message.into())
    }

    /// Create a transaction error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction(message.into())
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::Busy(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Message suitable for a one-line status display
    pub fn user_message(&self) -> String {
        match self {
            Self::NoAccount(_) => "Please connect your wallet first.".to_string(),
            Self::UnknownTarget(symbol) => format!("Unsupported target token: {}", symbol),
            Self::Busy(_) => "Another operation is already running.".to_string(),
            Self::Rejected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for BridgeError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for BridgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

// Network error conversions
impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(format!("HTTP error: {}", err))
    }
}

impl From<ethers::providers::ProviderError> for BridgeError {
    fn from(err: ethers::providers::ProviderError) -> Self {
        Self::network(format!("Provider error: {}", err))
    }
}

impl From<config::ConfigError> for BridgeError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_error_creation() {
        let config_error = BridgeError::config("Invalid configuration");
        let quote_error = BridgeError::quote("Empty steps");
        let validation_error = BridgeError::validation("Invalid input");

        assert!(matches!(config_error, BridgeError::Config(_)));
        assert!(matches!(quote_error, BridgeError::Quote(_)));
        assert!(matches!(validation_error, BridgeError::Validation(_)));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let bridge_error: BridgeError = io_error.into();

        assert!(matches!(bridge_error, BridgeError::Storage(_)));
    }

    #[test]
    fn test_error_display() {
        let error = BridgeError::network("rpc unreachable");
        let display = format!("{}", error);

        assert!(display.contains("Network error"));
        assert!(display.contains("rpc unreachable"));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            BridgeError::no_account("scan").user_message(),
            "Please connect your wallet first."
        );
        assert_eq!(
            BridgeError::rejected("User rejected transaction").user_message(),
            "User rejected transaction"
        );
        assert!(BridgeError::unknown_target("DOGE").user_message().contains("DOGE"));
    }
}
