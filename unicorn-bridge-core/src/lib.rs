//! Unicorn Bridge Core
//!
//! Balance discovery, route selection and route execution for Unicorn.eth
//! smart accounts across Ethereum, Polygon and Base.
//!
//! ## Architecture
//!
//! - **Core**: balance scanner, route finder, route executor, the session
//!   state machine, transaction approval and connection hints
//! - **Domain**: entities and the repository traits the core drives
//! - **Infrastructure**: JSON-RPC, bridge quote API, signer, storage, config
//! - **Shared**: common types, constants, and utilities
//!
//! ## Usage
//!
//! ```rust,no_run
//! use unicorn_bridge_core::{init_bridge_core, ExecutionMode, RouteTarget};
//!
//! # async fn run() -> Result<(), unicorn_bridge_core::BridgeError> {
//! let core = init_bridge_core().await?;
//! core.session.connect().await?;
//! core.session.scan().await?;
//! core.session.find_routes(RouteTarget::new("10", "PYUSD")).await?;
//! let report = core.session.execute(ExecutionMode::Simulate).await?;
//! println!("{:?}", report.outcome);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod core;
pub mod domain;
pub mod shared;
pub mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::domain::repositories::{AccountProvider, PlatformStorage, TransactionSender};

// Re-export specific components
pub use crate::core::{
    ApprovingSender, BalanceScanner, BridgeSession, ConnectionHints, ExecutionOutcome, ExecutionReport,
    RouteExecutor, RouteFinder, SessionParts, SessionSnapshot, StaticApproval, SufficiencyPolicy,
    TransactionHistory, TransactionPreferences,
};
pub use crate::core::approval::{HistoryEntry, HistoryStats, HistoryStatus};

// Re-export domain entities
pub use crate::domain::entities::{
    BridgeQuote, ChainDescriptor, FlowStatus, RouteComplexity, RouteOption, RouteTarget, StatusKind,
    TokenDescriptor, UserBalance,
};

// Re-export shared types
pub use crate::infrastructure::BridgeConfig;
pub use crate::shared::error::BridgeError;
pub use crate::shared::types::{ExecutionMode, TransactionDescriptor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install the `env_logger` backend; a second call is a no-op
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Initialize the bridge core with configuration from `.env`, `unicorn.toml`
/// and the environment
pub async fn init_bridge_core() -> Result<BridgeCore, BridgeError> {
    let config = BridgeConfig::load()?;
    BridgeCore::from_config(config)
}

/// A fully wired session plus the handles callers need alongside it
pub struct BridgeCore {
    pub config: BridgeConfig,
    pub session: Arc<BridgeSession>,
    pub sender: Arc<ApprovingSender>,
    pub history: Arc<TransactionHistory>,
}

impl BridgeCore {
    pub fn from_config(config: BridgeConfig) -> Result<Self, BridgeError> {
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(BridgeError::config(problems.join("; ")));
        }

        let local: Arc<dyn PlatformStorage> = Arc::new(infrastructure::FileStorage::new(&config.storage_dir)?);
        let session_store: Arc<dyn PlatformStorage> = Arc::new(infrastructure::MemoryStorage::new());

        let balances = Arc::new(infrastructure::RpcBalanceReader::new(&config.chains, config.request_timeout())?);
        let quotes = Arc::new(infrastructure::HttpQuoteProvider::new(
            &config.quote_api_url,
            config.client_id.as_deref(),
            config.request_timeout(),
        )?);

        let (signer, accounts): (Arc<dyn TransactionSender>, Arc<dyn AccountProvider>) =
            match (&config.private_key, &config.account) {
                (Some(key), _) => {
                    let wallet = Arc::new(infrastructure::EthersTransactionSender::new(key, &config.chains)?);
                    log::info!("Local signer enabled for {}", wallet.address());
                    let signer: Arc<dyn TransactionSender> = wallet.clone();
                    let accounts: Arc<dyn AccountProvider> = wallet;
                    (signer, accounts)
                }
                (None, Some(account)) => {
                    log::info!("Read-only session for {}", account);
                    let accounts: Arc<dyn AccountProvider> =
                        Arc::new(infrastructure::StaticAccountProvider::new(account)?);
                    (Arc::new(infrastructure::NoWallet) as Arc<dyn TransactionSender>, accounts)
                }
                (None, None) => {
                    let wallet = Arc::new(infrastructure::NoWallet);
                    (wallet.clone() as Arc<dyn TransactionSender>, wallet as Arc<dyn AccountProvider>)
                }
            };

        let history = Arc::new(TransactionHistory::load(local.clone()));
        let sender = Arc::new(ApprovingSender::new(
            signer,
            Arc::new(StaticApproval(config.auto_approve)),
            local.clone(),
            history.clone(),
        ));

        let session = BridgeSession::new(
            config.chains.clone(),
            SessionParts {
                balances,
                quotes,
                sender: sender.clone(),
                accounts,
            },
        )
        .with_hints(ConnectionHints::new(local, session_store))
        .with_policy(config.policy())
        .with_step_delay(config.step_delay())
        .with_auto_connect_timeout(config.auto_connect_timeout());

        log::info!("{} {} ready with {} chains", NAME, VERSION, config.chains.len());

        Ok(Self {
            config,
            session: Arc::new(session),
            sender,
            history,
        })
    }
}
