//! Quote repository for the external bridge service

use async_trait::async_trait;
use crate::domain::entities::quote::{BridgeQuote, QuoteRequest};
use crate::shared::error::BridgeError;

/// Source of executable bridge quotes
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Prepare a "buy": deliver `request.amount` of the destination token
    async fn prepare_buy(&self, request: &QuoteRequest) -> Result<BridgeQuote, BridgeError>;
}
