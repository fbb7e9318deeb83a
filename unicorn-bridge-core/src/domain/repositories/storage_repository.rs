//! Storage repository for persisted UX state

use crate::shared::error::BridgeError;

/// Key/value store for connection hints, preferences and history
pub trait PlatformStorage: Send + Sync {
    fn store(&self, key: &str, data: &[u8]) -> Result<(), BridgeError>;

    /// `Ok(None)` when the key is absent
    fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, BridgeError>;

    fn delete(&self, key: &str) -> Result<(), BridgeError>;

    fn exists(&self, key: &str) -> Result<bool, BridgeError>;

    fn list_keys(&self) -> Result<Vec<String>, BridgeError>;

    fn store_string(&self, key: &str, value: &str) -> Result<(), BridgeError> {
        self.store(key, value.as_bytes())
    }

    fn retrieve_string(&self, key: &str) -> Result<Option<String>, BridgeError> {
        match self.retrieve(key)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| BridgeError::storage(format!("Invalid UTF-8 under {}: {}", key, e))),
            None => Ok(None),
        }
    }
}
