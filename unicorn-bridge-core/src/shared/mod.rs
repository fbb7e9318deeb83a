//! Shared types, utilities, and constants
//!
//! This module contains common types, utilities, and constants used throughout
//! the bridge core.

pub mod types;
pub mod utils;
pub mod constants;
pub mod error;

// Re-export shared components
pub use types::*;
pub use utils::*;
pub use error::*;
