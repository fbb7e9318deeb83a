use std::sync::Arc;
use unicorn_bridge_core::{BridgeCore, BridgeSession, TransactionHistory};

/// Shared handler state: one session per relay process
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<BridgeSession>,
    pub history: Arc<TransactionHistory>,
}

impl AppState {
    pub fn new(session: Arc<BridgeSession>, history: Arc<TransactionHistory>) -> Self {
        Self { session, history }
    }

    pub fn from_core(core: &BridgeCore) -> Self {
        Self::new(core.session.clone(), core.history.clone())
    }
}
