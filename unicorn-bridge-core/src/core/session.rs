//! Bridge session
//!
//! Owns the state of one user's scan → route → execute flow and exposes it
//! as explicit transitions. Only one transition runs at a time; a second
//! caller gets `BridgeError::Busy` instead of interleaving with the first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use crate::core::executor::{ExecutionReport, RouteExecutor, StatusReporter};
use crate::core::hints::ConnectionHints;
use crate::core::router::{default_selection, RouteFinder, SufficiencyPolicy};
use crate::core::scanner::BalanceScanner;
use crate::domain::entities::{ChainDescriptor, FlowStatus, RouteOption, RouteTarget, UserBalance};
use crate::domain::repositories::{AccountProvider, BalanceReader, QuoteProvider, TransactionSender};
use crate::shared::constants::AUTO_CONNECT_TIMEOUT_MS;
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, ExecutionMode};
use crate::shared::utils::{short_address, validate_ethereum_address};

/// External collaborators of a session
pub struct SessionParts {
    pub balances: Arc<dyn BalanceReader>,
    pub quotes: Arc<dyn QuoteProvider>,
    pub sender: Arc<dyn TransactionSender>,
    pub accounts: Arc<dyn AccountProvider>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub account: Option<Address>,
    pub balances: Vec<UserBalance>,
    pub routes: Vec<RouteOption>,
    pub selected_route: Option<usize>,
    pub target: Option<RouteTarget>,
    pub status: FlowStatus,
    pub last_report: Option<ExecutionReport>,
}

#[derive(Default)]
struct SessionState {
    account: Option<Address>,
    balances: Vec<UserBalance>,
    routes: Vec<RouteOption>,
    selected: Option<usize>,
    target: Option<RouteTarget>,
    last_report: Option<ExecutionReport>,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BridgeSession {
    chains: Vec<ChainDescriptor>,
    scanner: BalanceScanner,
    finder: RouteFinder,
    executor: RouteExecutor,
    accounts: Arc<dyn AccountProvider>,
    hints: Option<ConnectionHints>,
    auto_connect_timeout: Duration,
    state: RwLock<SessionState>,
    status: watch::Sender<FlowStatus>,
    in_flight: AtomicBool,
}

impl BridgeSession {
    pub fn new(chains: Vec<ChainDescriptor>, parts: SessionParts) -> Self {
        let (status, _) = watch::channel(FlowStatus::idle());
        Self {
            scanner: BalanceScanner::new(chains.clone(), parts.balances.clone()),
            finder: RouteFinder::new(parts.quotes.clone()),
            executor: RouteExecutor::new(chains.clone(), parts.balances, parts.quotes, parts.sender),
            chains,
            accounts: parts.accounts,
            hints: None,
            auto_connect_timeout: Duration::from_millis(AUTO_CONNECT_TIMEOUT_MS),
            state: RwLock::new(SessionState::default()),
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_hints(mut self, hints: ConnectionHints) -> Self {
        self.hints = Some(hints);
        self
    }

    pub fn with_policy(mut self, policy: SufficiencyPolicy) -> Self {
        self.finder = self.finder.with_policy(policy);
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.executor = self.executor.with_step_delay(delay);
        self
    }

    pub fn with_auto_connect_timeout(mut self, timeout: Duration) -> Self {
        self.auto_connect_timeout = timeout;
        self
    }

    pub fn chains(&self) -> &[ChainDescriptor] {
        &self.chains
    }

    pub fn status(&self) -> FlowStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowStatus> {
        self.status.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn account(&self) -> Option<Address> {
        self.state.read().await.account.clone()
    }

    pub async fn balances(&self) -> Vec<UserBalance> {
        self.state.read().await.balances.clone()
    }

    pub async fn routes(&self) -> Vec<RouteOption> {
        self.state.read().await.routes.clone()
    }

    pub async fn selected_route(&self) -> Option<(usize, RouteOption)> {
        let state = self.state.read().await;
        state
            .selected
            .and_then(|i| state.routes.get(i).map(|r| (i, r.clone())))
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            account: state.account.clone(),
            balances: state.balances.clone(),
            routes: state.routes.clone(),
            selected_route: state.selected,
            target: state.target.clone(),
            status: self.status(),
            last_report: state.last_report.clone(),
        }
    }

    /// Ask the wallet for its active account
    pub async fn connect(&self) -> Result<Address, BridgeError> {
        let _guard = self.begin()?;
        match self.accounts.connect().await {
            Ok(address) => self.set_account(address).await,
            Err(e) => Err(self.report_error(e)),
        }
    }

    /// Use a known account address without going through the wallet
    pub async fn connect_address(&self, address: &str) -> Result<Address, BridgeError> {
        let _guard = self.begin()?;
        validate_ethereum_address(address)?;
        self.set_account(address.to_string()).await
    }

    /// `connect` bounded by the auto-connect timeout
    pub async fn auto_connect(&self) -> Result<Address, BridgeError> {
        let _guard = self.begin()?;
        if let Some(hints) = &self.hints {
            if let Err(e) = hints.prune(Utc::now()) {
                log::warn!("Failed to prune connection hints: {}", e);
            }
        }

        let result = match tokio::time::timeout(self.auto_connect_timeout, self.accounts.connect()).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::network(format!(
                "Auto-connect timed out after {} ms",
                self.auto_connect_timeout.as_millis()
            ))),
        };

        if let Some(hints) = &self.hints {
            if let Err(e) = hints.record_detection(result.is_ok(), "auto_connect") {
                log::warn!("Failed to cache environment detection: {}", e);
            }
        }

        match result {
            Ok(address) => self.set_account(address).await,
            Err(e) => Err(self.report_error(e)),
        }
    }

    pub async fn disconnect(&self) -> Result<(), BridgeError> {
        let _guard = self.begin()?;
        *self.state.write().await = SessionState::default();
        if let Some(hints) = &self.hints {
            hints.forget()?;
        }
        log::info!("Disconnected");
        self.publish(FlowStatus::idle());
        Ok(())
    }

    /// Replace the balance set. Re-runs route finding when a target is set.
    pub async fn scan(&self) -> Result<Vec<UserBalance>, BridgeError> {
        let _guard = self.begin()?;
        let account = self.state.read().await.account.clone();
        self.publish(FlowStatus::scanning(format!("Scanning {} chains", self.chains.len())));

        let balances = match self.scanner.scan(account.as_deref()).await {
            Ok(balances) => balances,
            Err(e) => return Err(self.report_error(e)),
        };

        let target = {
            let mut state = self.state.write().await;
            state.balances = balances.clone();
            state.routes.clear();
            state.selected = None;
            state.target.clone()
        };
        self.publish(FlowStatus::found(format!("Found {} balances", balances.len())));

        if let Some(target) = target {
            self.find_inner(target).await?;
        }
        Ok(balances)
    }

    /// Replace the route list for `target` and re-apply the default selection
    pub async fn find_routes(&self, target: RouteTarget) -> Result<Vec<RouteOption>, BridgeError> {
        let _guard = self.begin()?;
        self.find_inner(target).await
    }

    pub async fn select_route(&self, index: usize) -> Result<RouteOption, BridgeError> {
        let _guard = self.begin()?;
        let mut state = self.state.write().await;
        let route = state
            .routes
            .get(index)
            .cloned()
            .ok_or_else(|| BridgeError::validation(format!("No route at index {}", index)))?;
        state.selected = Some(index);
        self.publish(FlowStatus::found(format!("Selected {}", route.summary())));
        Ok(route)
    }

    /// Execute the selected route
    pub async fn execute(&self, mode: ExecutionMode) -> Result<ExecutionReport, BridgeError> {
        let _guard = self.begin()?;
        let (account, route, target) = {
            let state = self.state.read().await;
            let account = state.account.clone();
            let route = state.selected.and_then(|i| state.routes.get(i).cloned());
            (account, route, state.target.clone())
        };
        let account = match account {
            Some(account) => account,
            None => return Err(self.report_error(BridgeError::no_account("No connected account"))),
        };
        let (route, target) = match (route, target) {
            (Some(route), Some(target)) => (route, target),
            _ => return Err(self.report_error(BridgeError::validation("No route selected"))),
        };

        let reporter = StatusReporter::with_channel(self.status.clone());
        let report = match self.executor.execute(&route, &target, &account, mode, reporter).await {
            Ok(report) => report,
            Err(e) => return Err(self.report_error(e)),
        };
        self.state.write().await.last_report = Some(report.clone());
        Ok(report)
    }

    async fn find_inner(&self, target: RouteTarget) -> Result<Vec<RouteOption>, BridgeError> {
        // A pass owns the route list. A failed pass must not leave the previous
        // target executable.
        let (account, balances) = {
            let mut state = self.state.write().await;
            state.routes.clear();
            state.selected = None;
            state.target = None;
            (state.account.clone(), state.balances.clone())
        };
        let account = match account {
            Some(account) => account,
            None => return Err(self.report_error(BridgeError::no_account("No connected account"))),
        };

        self.publish(FlowStatus::finding(format!("Finding routes to {} {}", target.amount, target.token_symbol)));
        let routes = match self.finder.find_routes(&self.chains, &balances, &target, &account).await {
            Ok(routes) => routes,
            Err(e) => return Err(self.report_error(e)),
        };

        let selected = default_selection(&routes);
        {
            let mut state = self.state.write().await;
            state.routes = routes.clone();
            state.selected = selected;
            state.target = Some(target);
        }

        match selected.and_then(|i| routes.get(i)) {
            Some(route) if !route.insufficient_funds => {
                self.publish(FlowStatus::found(format!("Found {} routes", routes.len())))
            }
            Some(_) => self.publish(FlowStatus::found(format!(
                "Found {} routes, none with sufficient funds",
                routes.len()
            ))),
            None => self.publish(FlowStatus::error("No routes found")),
        }
        Ok(routes)
    }

    async fn set_account(&self, address: Address) -> Result<Address, BridgeError> {
        {
            let mut state = self.state.write().await;
            *state = SessionState {
                account: Some(address.clone()),
                ..SessionState::default()
            };
        }
        if let Some(hints) = &self.hints {
            if let Err(e) = hints.remember(self.accounts.name(), Utc::now()) {
                log::warn!("Failed to store connection hint: {}", e);
            }
        }
        log::info!("Connected {}", short_address(&address));
        self.publish(FlowStatus::idle());
        Ok(address)
    }

    fn begin(&self) -> Result<InFlight<'_>, BridgeError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| BridgeError::busy("Another operation is already running"))
    }

    fn publish(&self, status: FlowStatus) {
        log::debug!("Status: {}", status);
        self.status.send_replace(status);
    }

    fn report_error(&self, error: BridgeError) -> BridgeError {
        log::warn!("{}", error);
        self.publish(FlowStatus::error(error.user_message()));
        error
    }
}
