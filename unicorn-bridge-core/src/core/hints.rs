//! Connection hints and the cached environment detection
//!
//! Advisory UX state only. A missing or unreadable hint never blocks a flow.

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use crate::domain::repositories::PlatformStorage;
use crate::shared::constants::{
    CONNECTION_HINT_MAX_AGE_DAYS, KEY_CONNECTION_TIME, KEY_DETECTION_METHOD, KEY_ENV_DETECTED,
    KEY_LAST_WALLET_CONNECTION, KEY_UNICORN_CONNECTED,
};
use crate::shared::error::BridgeError;

pub struct ConnectionHints {
    local: Arc<dyn PlatformStorage>,
    session: Arc<dyn PlatformStorage>,
}

impl ConnectionHints {
    /// `local` survives restarts, `session` lives for the process
    pub fn new(local: Arc<dyn PlatformStorage>, session: Arc<dyn PlatformStorage>) -> Self {
        Self { local, session }
    }

    pub fn remember(&self, wallet: &str, at: DateTime<Utc>) -> Result<(), BridgeError> {
        self.local.store_string(KEY_UNICORN_CONNECTED, "true")?;
        self.local.store_string(KEY_LAST_WALLET_CONNECTION, wallet)?;
        self.local.store_string(KEY_CONNECTION_TIME, &at.timestamp_millis().to_string())
    }

    pub fn forget(&self) -> Result<(), BridgeError> {
        for key in [KEY_UNICORN_CONNECTED, KEY_LAST_WALLET_CONNECTION, KEY_CONNECTION_TIME] {
            self.local.delete(key)?;
        }
        Ok(())
    }

    /// Wallet name of a hint that is still fresh
    pub fn last_wallet(&self, now: DateTime<Utc>) -> Option<String> {
        if self.is_stale(now) {
            return None;
        }
        self.local.retrieve_string(KEY_LAST_WALLET_CONNECTION).ok().flatten()
    }

    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.local.retrieve_string(KEY_CONNECTION_TIME).ok().flatten()?;
        let millis: i64 = raw.trim().parse().ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis)
    }

    /// Hints without a timestamp, or older than the retention window
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.connected_at() {
            Some(at) => now - at > Duration::days(CONNECTION_HINT_MAX_AGE_DAYS),
            None => true,
        }
    }

    /// Drop stale hints; returns whether anything was removed
    pub fn prune(&self, now: DateTime<Utc>) -> Result<bool, BridgeError> {
        let present = self.local.exists(KEY_UNICORN_CONNECTED)?;
        if present && self.is_stale(now) {
            log::info!("Clearing stale connection hints");
            self.forget()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn record_detection(&self, detected: bool, method: &str) -> Result<(), BridgeError> {
        self.session
            .store_string(KEY_ENV_DETECTED, if detected { "true" } else { "false" })?;
        self.session.store_string(KEY_DETECTION_METHOD, method)
    }

    /// Cached `(detected, method)` for this process
    pub fn detection(&self) -> Option<(bool, String)> {
        let detected = self.session.retrieve_string(KEY_ENV_DETECTED).ok().flatten()?;
        let method = self
            .session
            .retrieve_string(KEY_DETECTION_METHOD)
            .ok()
            .flatten()
            .unwrap_or_default();
        Some((detected == "true", method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::MemoryStorage;

    fn hints() -> (ConnectionHints, Arc<MemoryStorage>) {
        let local = Arc::new(MemoryStorage::new());
        (ConnectionHints::new(local.clone(), Arc::new(MemoryStorage::new())), local)
    }

    #[test]
    fn test_remember_and_forget() {
        let (hints, local) = hints();
        let now = Utc::now();
        hints.remember("unicorn", now).expect("remember");

        assert_eq!(hints.last_wallet(now).as_deref(), Some("unicorn"));
        assert_eq!(
            local.retrieve_string(KEY_UNICORN_CONNECTED).expect("read").as_deref(),
            Some("true")
        );

        hints.forget().expect("forget");
        assert!(hints.last_wallet(now).is_none());
        assert!(local.list_keys().expect("keys").is_empty());
    }

    #[test]
    fn test_stale_hints_are_pruned() {
        let (hints, _) = hints();
        let then = Utc::now() - Duration::days(8);
        hints.remember("unicorn", then).expect("remember");

        let now = Utc::now();
        assert!(hints.is_stale(now));
        assert!(hints.last_wallet(now).is_none());
        assert!(hints.prune(now).expect("prune"));
        assert!(!hints.prune(now).expect("prune"));
    }

    #[test]
    fn test_fresh_hints_survive_prune() {
        let (hints, _) = hints();
        let then = Utc::now() - Duration::days(6);
        hints.remember("unicorn", then).expect("remember");
        assert!(!hints.prune(Utc::now()).expect("prune"));
        assert!(hints.last_wallet(Utc::now()).is_some());
    }

    #[test]
    fn test_detection_cache() {
        let (hints, _) = hints();
        assert!(hints.detection().is_none());
        hints.record_detection(true, "url_params").expect("record");
        assert_eq!(hints.detection(), Some((true, "url_params".to_string())));
    }
}
