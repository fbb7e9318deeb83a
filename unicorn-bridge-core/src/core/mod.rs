//! Core bridge functionality
//!
//! This module contains the balance scanner, route finder, route executor,
//! the session state object tying them together, and the approval layer.

pub mod scanner;
pub mod router;
pub mod executor;
pub mod session;
pub mod approval;
pub mod hints;

pub use scanner::BalanceScanner;
pub use router::{default_selection, sort_routes, RouteFinder, SufficiencyPolicy};
pub use executor::{ExecutionOutcome, ExecutionReport, RouteExecutor, StatusReporter};
pub use session::{BridgeSession, SessionParts, SessionSnapshot};
pub use approval::{ApprovalGate, ApprovingSender, StaticApproval, TransactionHistory, TransactionPreferences};
pub use hints::ConnectionHints;
