//! Domain repositories
//!
//! Traits at the boundaries of the core: chain reads, the quote service, the
//! wallet, and key/value storage.

pub mod balance_repository;
pub mod quote_repository;
pub mod wallet_repository;
pub mod storage_repository;

// Re-export repositories
pub use balance_repository::*;
pub use quote_repository::*;
pub use wallet_repository::*;
pub use storage_repository::*;
