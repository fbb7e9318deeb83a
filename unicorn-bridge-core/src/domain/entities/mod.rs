pub mod balance;
pub mod chain;
pub mod quote;
pub mod route;
pub mod status;
pub mod target;

pub use balance::*;
pub use chain::*;
pub use quote::*;
pub use route::*;
pub use status::*;
pub use target::*;
