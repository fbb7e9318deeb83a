//! Domain layer - entities and repositories
//!
//! Entities describe chains, balances, quotes and routes. Repositories are
//! the traits the core drives and the infrastructure implements.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
