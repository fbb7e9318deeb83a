//! Transaction approval, preferences and history
//!
//! `ApprovingSender` sits in front of any `TransactionSender`. Transactions
//! within the auto-approve threshold pass straight through; the rest go to an
//! `ApprovalGate` first. Every submission attempt lands in the history.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::domain::repositories::{PlatformStorage, TransactionSender};
use crate::shared::constants::{HISTORY_MEMORY_LIMIT, HISTORY_PERSIST_LIMIT, KEY_TX_HISTORY, KEY_TX_PREFERENCES};
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, BaseUnits, ChainId, TransactionDescriptor, TransactionHash};
use crate::shared::utils::{current_timestamp_ms, generate_id, parse_base_units};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPreferences {
    /// Native value in wei that is approved without asking
    pub auto_approve_threshold: BaseUnits,
    pub require_simulation: bool,
    pub require_confirmation: bool,
    pub save_history: bool,
}

impl Default for TransactionPreferences {
    fn default() -> Self {
        Self {
            auto_approve_threshold: "0".to_string(),
            require_simulation: true,
            require_confirmation: true,
            save_history: true,
        }
    }
}

impl TransactionPreferences {
    /// Stored preferences, or the defaults when absent or unreadable
    pub fn load(storage: &dyn PlatformStorage) -> Self {
        match storage.retrieve(KEY_TX_PREFERENCES) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable transaction preferences: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Failed to read transaction preferences: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &dyn PlatformStorage) -> Result<(), BridgeError> {
        storage.store(KEY_TX_PREFERENCES, &serde_json::to_vec(self)?)
    }

    pub fn can_auto_approve(&self, transaction: &TransactionDescriptor) -> bool {
        if !self.require_confirmation {
            return true;
        }
        let value = match transaction.value.as_deref() {
            None => return true,
            Some(v) => parse_base_units(v),
        };
        match (value, parse_base_units(&self.auto_approve_threshold)) {
            (Ok(value), Ok(threshold)) => value <= threshold,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default = "generate_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<TransactionHash>,
    pub timestamp: i64,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub method: String,
    pub to: Address,
    pub value: BaseUnits,
    pub chain_id: ChainId,
    pub status: HistoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub average_duration_ms: u64,
    /// Whole percent
    pub success_rate: u32,
}

/// Newest-first transaction log
pub struct TransactionHistory {
    storage: Arc<dyn PlatformStorage>,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl TransactionHistory {
    pub fn load(storage: Arc<dyn PlatformStorage>) -> Self {
        let entries = match storage.retrieve(KEY_TX_HISTORY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable transaction history: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read transaction history: {}", e);
                Vec::new()
            }
        };
        Self {
            storage,
            entries: Mutex::new(entries),
        }
    }

    /// Add `entry` at the front. With `persist`, the newest entries are written back.
    pub fn record(&self, entry: HistoryEntry, persist: bool) -> Result<(), BridgeError> {
        let mut entries = self.lock()?;
        entries.insert(0, entry);
        entries.truncate(HISTORY_MEMORY_LIMIT);
        if persist {
            let kept = &entries[..entries.len().min(HISTORY_PERSIST_LIMIT)];
            self.storage.store(KEY_TX_HISTORY, &serde_json::to_vec(kept)?)?;
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.lock()
            .map(|e| e.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) -> Result<(), BridgeError> {
        self.lock()?.clear();
        self.storage.delete(KEY_TX_HISTORY)
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.entries();
        let total = entries.len();
        if total == 0 {
            return HistoryStats::default();
        }
        let successful = entries.iter().filter(|e| e.status == HistoryStatus::Success).count();
        let duration: u64 = entries.iter().map(|e| e.duration_ms).sum();

        HistoryStats {
            total,
            successful,
            failed: total - successful,
            average_duration_ms: (duration + total as u64 / 2) / total as u64,
            success_rate: ((successful * 200 + total) / (total * 2)) as u32,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<HistoryEntry>>, BridgeError> {
        self.entries
            .lock()
            .map_err(|_| BridgeError::internal("Transaction history lock poisoned"))
    }
}

/// Asks the user (or a policy) to confirm a transaction
#[async_trait]
pub trait ApprovalGate: Send + Sync {
    async fn approve(&self, transaction: &TransactionDescriptor) -> bool;
}

/// Gate with a fixed answer
pub struct StaticApproval(pub bool);

#[async_trait]
impl ApprovalGate for StaticApproval {
    async fn approve(&self, transaction: &TransactionDescriptor) -> bool {
        log::info!(
            "{} transaction to {} on chain {}",
            if self.0 { "Approving" } else { "Rejecting" },
            transaction.to,
            transaction.chain_id
        );
        self.0
    }
}

pub struct ApprovingSender {
    inner: Arc<dyn TransactionSender>,
    gate: Arc<dyn ApprovalGate>,
    storage: Arc<dyn PlatformStorage>,
    preferences: RwLock<TransactionPreferences>,
    history: Arc<TransactionHistory>,
}

impl ApprovingSender {
    pub fn new(
        inner: Arc<dyn TransactionSender>,
        gate: Arc<dyn ApprovalGate>,
        storage: Arc<dyn PlatformStorage>,
        history: Arc<TransactionHistory>,
    ) -> Self {
        let preferences = TransactionPreferences::load(storage.as_ref());
        Self {
            inner,
            gate,
            storage,
            preferences: RwLock::new(preferences),
            history,
        }
    }

    pub fn preferences(&self) -> TransactionPreferences {
        self.preferences.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn set_preferences(&self, preferences: TransactionPreferences) -> Result<(), BridgeError> {
        preferences.save(self.storage.as_ref())?;
        let mut current = self
            .preferences
            .write()
            .map_err(|_| BridgeError::internal("Preferences lock poisoned"))?;
        *current = preferences;
        Ok(())
    }

    pub fn history(&self) -> &Arc<TransactionHistory> {
        &self.history
    }
}

#[async_trait]
impl TransactionSender for ApprovingSender {
    async fn send_transaction(&self, transaction: &TransactionDescriptor) -> Result<TransactionHash, BridgeError> {
        let preferences = self.preferences();
        if !preferences.can_auto_approve(transaction) && !self.gate.approve(transaction).await {
            return Err(BridgeError::rejected("User rejected transaction"));
        }

        let started = Instant::now();
        let result = self.inner.send_transaction(transaction).await;

        if preferences.save_history {
            let (hash, status, error) = match &result {
                Ok(hash) => (Some(hash.clone()), HistoryStatus::Success, None),
                Err(e) => (None, HistoryStatus::Failed, Some(e.to_string())),
            };
            let entry = HistoryEntry {
                id: generate_id(),
                hash,
                timestamp: current_timestamp_ms(),
                duration_ms: started.elapsed().as_millis() as u64,
                method: transaction.action.clone().unwrap_or_else(|| "Unknown".to_string()),
                to: transaction.to.clone(),
                value: transaction.value.clone().unwrap_or_else(|| "0".to_string()),
                chain_id: transaction.chain_id,
                status,
                error,
            };
            if let Err(e) = self.history.record(entry, true) {
                log::warn!("Failed to record transaction history: {}", e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorage;
    use crate::test_utils::{RecordingSender, OTHER_ACCOUNT};

    fn entry(status: HistoryStatus, duration_ms: u64) -> HistoryEntry {
        HistoryEntry {
            id: generate_id(),
            hash: None,
            timestamp: 0,
            duration_ms,
            method: "transfer".to_string(),
            to: OTHER_ACCOUNT.to_string(),
            value: "0".to_string(),
            chain_id: 137,
            status,
            error: None,
        }
    }

    fn sender(
        inner: RecordingSender,
        approve: bool,
        storage: Arc<MemoryStorage>,
    ) -> ApprovingSender {
        let history = Arc::new(TransactionHistory::load(storage.clone()));
        ApprovingSender::new(Arc::new(inner), Arc::new(StaticApproval(approve)), storage, history)
    }

    #[test]
    fn test_default_preferences() {
        let storage = MemoryStorage::new();
        let preferences = TransactionPreferences::load(&storage);
        assert_eq!(preferences, TransactionPreferences::default());

        let custom = TransactionPreferences {
            require_confirmation: false,
            ..Default::default()
        };
        custom.save(&storage).expect("save");
        assert_eq!(TransactionPreferences::load(&storage), custom);

        let raw = storage.retrieve_string(KEY_TX_PREFERENCES).expect("read").expect("stored");
        assert!(raw.contains("\"requireConfirmation\":false"));
    }

    #[test]
    fn test_auto_approve_rules() {
        let preferences = TransactionPreferences::default();
        let zero = TransactionDescriptor::new(1, OTHER_ACCOUNT).with_value("0");
        let valued = TransactionDescriptor::new(1, OTHER_ACCOUNT).with_value("1000");
        assert!(preferences.can_auto_approve(&zero));
        assert!(preferences.can_auto_approve(&TransactionDescriptor::new(1, OTHER_ACCOUNT)));
        assert!(!preferences.can_auto_approve(&valued));

        let relaxed = TransactionPreferences {
            auto_approve_threshold: "1000".to_string(),
            ..Default::default()
        };
        assert!(relaxed.can_auto_approve(&valued));

        let unconfirmed = TransactionPreferences {
            require_confirmation: false,
            ..Default::default()
        };
        assert!(unconfirmed.can_auto_approve(&valued.with_value("0xffff")));
    }

    #[tokio::test]
    async fn test_rejected_transaction_is_not_sent() {
        let inner = RecordingSender::new();
        let sender = sender(inner.clone(), false, Arc::new(MemoryStorage::new()));
        let tx = TransactionDescriptor::new(1, OTHER_ACCOUNT).with_value("5");

        let err = sender.send_transaction(&tx).await.unwrap_err();
        assert_eq!(err.user_message(), "User rejected transaction");
        assert!(inner.sent().is_empty());
        assert!(sender.history().entries().is_empty());
    }

    #[tokio::test]
    async fn test_history_records_success_and_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let inner = RecordingSender::failing_at(1);
        let sender = sender(inner, true, storage.clone());
        let tx = TransactionDescriptor::new(1, OTHER_ACCOUNT).with_action("approval");

        assert!(sender.send_transaction(&tx).await.is_ok());
        assert!(sender.send_transaction(&tx).await.is_err());

        let entries = sender.history().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, HistoryStatus::Failed);
        assert_eq!(entries[1].status, HistoryStatus::Success);
        assert_eq!(entries[1].method, "approval");

        let stats = sender.history().stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.success_rate, 50);

        let reloaded = TransactionHistory::load(storage);
        assert_eq!(reloaded.entries().len(), 2);
    }

    #[test]
    fn test_history_limits() {
        let storage = Arc::new(MemoryStorage::new());
        let history = TransactionHistory::load(storage.clone());
        for i in 0..120 {
            history.record(entry(HistoryStatus::Success, i), true).expect("record");
        }
        assert_eq!(history.entries().len(), HISTORY_MEMORY_LIMIT);
        assert_eq!(history.entries()[0].duration_ms, 119);
        assert_eq!(history.recent(5).len(), 5);

        let persisted = TransactionHistory::load(storage.clone());
        assert_eq!(persisted.entries().len(), HISTORY_PERSIST_LIMIT);

        history.clear().expect("clear");
        assert!(history.entries().is_empty());
        assert!(!storage.exists(KEY_TX_HISTORY).expect("exists"));
    }

    #[test]
    fn test_stats_rounding() {
        let history = TransactionHistory::load(Arc::new(MemoryStorage::new()));
        assert_eq!(history.stats(), HistoryStats::default());

        history.record(entry(HistoryStatus::Success, 100), false).expect("record");
        history.record(entry(HistoryStatus::Success, 200), false).expect("record");
        history.record(entry(HistoryStatus::Failed, 201), false).expect("record");
        let stats = history.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.average_duration_ms, 167);
        assert_eq!(stats.success_rate, 67);
    }
}
