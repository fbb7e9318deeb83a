//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: JSON-RPC balance
//! reads, the HTTP quote client, local signing, file storage, plus the
//! layered configuration.

pub mod config;
pub mod rpc;
pub mod quote;
pub mod storage;
pub mod wallet;

pub use config::BridgeConfig;
pub use rpc::RpcBalanceReader;
pub use quote::HttpQuoteProvider;
pub use storage::{FileStorage, MemoryStorage};
pub use wallet::{EthersTransactionSender, NoWallet, StaticAccountProvider};
