//! Route discovery
//!
//! Classifies every scanned balance against the target, quotes the
//! cross-chain candidates, then ranks the result.

use std::sync::Arc;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use crate::domain::entities::{
    resolve_target, BridgeQuote, ChainDescriptor, QuoteRequest, ResolvedTarget, RouteComplexity, RouteOption, RouteTarget,
    UserBalance,
};
use crate::domain::repositories::QuoteProvider;
use crate::shared::constants::{CROSS_CHAIN_MULTIPLIER_BPS, DISPLAY_DECIMALS, SAME_CHAIN_MULTIPLIER_BPS};
use crate::shared::error::BridgeError;
use crate::shared::utils::{
    addresses_equal, apply_bps, format_comparable, format_units_rounded, parse_units, to_comparable,
};

/// Fallback sufficiency check for quotes without a usable source amount.
///
/// The balance must cover `target * multiplier`, both read as plain decimals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SufficiencyPolicy {
    pub cross_chain_bps: u64,
    pub same_chain_bps: u64,
}

impl Default for SufficiencyPolicy {
    fn default() -> Self {
        Self {
            cross_chain_bps: CROSS_CHAIN_MULTIPLIER_BPS,
            same_chain_bps: SAME_CHAIN_MULTIPLIER_BPS,
        }
    }
}

impl SufficiencyPolicy {
    /// Required amount on the 18-decimal comparison scale
    pub fn required(&self, target_amount: &str, same_chain: bool) -> Result<U256, BridgeError> {
        let bps = if same_chain { self.same_chain_bps } else { self.cross_chain_bps };
        Ok(apply_bps(to_comparable(target_amount)?, bps))
    }

    pub fn covers(&self, balance: &str, target_amount: &str, same_chain: bool) -> Result<bool, BridgeError> {
        Ok(to_comparable(balance)? >= self.required(target_amount, same_chain)?)
    }
}

/// Sufficient routes first, then by complexity rank. Stable.
pub fn sort_routes(routes: &mut [RouteOption]) {
    routes.sort_by_key(|r| (r.insufficient_funds, r.complexity.rank()));
}

/// First sufficient route, else the first route at all
pub fn default_selection(routes: &[RouteOption]) -> Option<usize> {
    routes
        .iter()
        .position(|r| !r.insufficient_funds)
        .or(if routes.is_empty() { None } else { Some(0) })
}

pub struct RouteFinder {
    quotes: Arc<dyn QuoteProvider>,
    policy: SufficiencyPolicy,
}

impl RouteFinder {
    pub fn new(quotes: Arc<dyn QuoteProvider>) -> Self {
        Self {
            quotes,
            policy: SufficiencyPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: SufficiencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SufficiencyPolicy {
        &self.policy
    }

    /// Ranked routes from `balances` to `target`.
    ///
    /// Fails as a whole only when the target cannot be placed on a chain.
    /// Quote failures drop the single candidate.
    pub async fn find_routes(
        &self,
        chains: &[ChainDescriptor],
        balances: &[UserBalance],
        target: &RouteTarget,
        account: &str,
    ) -> Result<Vec<RouteOption>, BridgeError> {
        target.validate()?;
        let resolved = resolve_target(&target.token_symbol, chains)?;
        let target_units = parse_units(&target.amount, resolved.token.decimals)?;
        if target_units.is_zero() {
            return Err(BridgeError::validation(format!(
                "Target amount {} is below the smallest unit of {}",
                target.amount, resolved.token.symbol
            )));
        }
        log::info!(
            "Finding routes to {} {} on {} across {} balances",
            target.amount,
            resolved.token.symbol,
            resolved.chain.name,
            balances.len()
        );

        let mut routes = Vec::new();
        for balance in balances {
            let same_chain = balance.chain_id == resolved.chain.id;
            let same_token = same_chain && addresses_equal(&balance.token_address, &resolved.token.address);

            if same_token {
                if let Some(route) = self.direct_route(balance, &resolved, target, target_units)? {
                    routes.push(route);
                }
            } else if same_chain {
                log::debug!(
                    "Skipping {} on {}: same-chain swaps are not routed",
                    balance.token_symbol,
                    balance.chain_name
                );
            } else if let Some(route) = self
                .bridge_route(balance, &resolved, target, target_units, account)
                .await?
            {
                routes.push(route);
            }
        }

        sort_routes(&mut routes);
        log::info!("Found {} routes", routes.len());
        Ok(routes)
    }

    /// Compares in the token's base units so a balance a few wei short of the
    /// target is not rounded up by the formatted display value.
    fn direct_route(
        &self,
        balance: &UserBalance,
        resolved: &ResolvedTarget,
        target: &RouteTarget,
        target_units: U256,
    ) -> Result<Option<RouteOption>, BridgeError> {
        if balance.raw_amount()? < target_units {
            log::debug!(
                "{} {} on {} does not cover {}",
                balance.formatted_balance,
                balance.token_symbol,
                balance.chain_name,
                target.amount
            );
            return Ok(None);
        }

        Ok(Some(RouteOption {
            from_chain: balance.chain_name.clone(),
            from_token: balance.token_symbol.clone(),
            from_balance: balance.formatted_balance.clone(),
            to_chain: resolved.chain.name.clone(),
            to_token: resolved.token.symbol.clone(),
            estimated_output: target.amount.clone(),
            estimated_input: Some(target.amount.clone()),
            steps: vec![format!(
                "Transfer {} {} on {}",
                target.amount, resolved.token.symbol, resolved.chain.name
            )],
            complexity: RouteComplexity::Simple,
            estimated: false,
            from_chain_id: balance.chain_id,
            to_chain_id: resolved.chain.id,
            from_token_address: balance.token_address.clone(),
            to_token_address: resolved.token.address.clone(),
            from_token_decimals: balance.decimals,
            to_token_decimals: resolved.token.decimals,
            bridge_quote: None,
            insufficient_funds: false,
            required_amount: None,
        }))
    }

    async fn bridge_route(
        &self,
        balance: &UserBalance,
        resolved: &ResolvedTarget,
        target: &RouteTarget,
        target_units: U256,
        account: &str,
    ) -> Result<Option<RouteOption>, BridgeError> {
        let request = QuoteRequest {
            origin_chain_id: balance.chain_id,
            origin_token_address: balance.token_address.clone(),
            destination_chain_id: resolved.chain.id,
            destination_token_address: resolved.token.address.clone(),
            amount: target_units.to_string(),
            sender: account.to_string(),
            receiver: account.to_string(),
        };

        let quote = match self.quotes.prepare_buy(&request).await {
            Ok(quote) if quote.is_executable() => quote,
            Ok(_) => {
                log::debug!(
                    "Dropping {} on {}: quote has no executable steps",
                    balance.token_symbol,
                    balance.chain_name
                );
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Dropping {} on {}: {}", balance.token_symbol, balance.chain_name, e);
                return Ok(None);
            }
        };

        let balance_units = balance.raw_amount()?;
        let (estimated_input, estimated_output, insufficient, required, estimated) =
            match quote.from_amount_units() {
                Some(cost) => {
                    let input = format_units_rounded(cost, balance.decimals, DISPLAY_DECIMALS);
                    let output = quote
                        .to_amount_units()
                        .map(|out| format_units_rounded(out, resolved.token.decimals, DISPLAY_DECIMALS))
                        .unwrap_or_else(|| target.amount.clone());
                    let insufficient = cost > balance_units;
                    let required = if insufficient { Some(input.clone()) } else { None };
                    (Some(input), output, insufficient, required, false)
                }
                None => {
                    let needed = self.policy.required(&target.amount, false)?;
                    let covered = self.policy.covers(&balance.formatted_balance, &target.amount, false)?;
                    let required = if covered { None } else { Some(format_comparable(needed, DISPLAY_DECIMALS)) };
                    (None, target.amount.clone(), !covered, required, true)
                }
            };

        Ok(Some(RouteOption {
            from_chain: balance.chain_name.clone(),
            from_token: balance.token_symbol.clone(),
            from_balance: balance.formatted_balance.clone(),
            to_chain: resolved.chain.name.clone(),
            to_token: resolved.token.symbol.clone(),
            estimated_output,
            estimated_input,
            steps: bridge_steps(balance, resolved, target, &quote),
            complexity: RouteComplexity::Bridge,
            estimated,
            from_chain_id: balance.chain_id,
            to_chain_id: resolved.chain.id,
            from_token_address: balance.token_address.clone(),
            to_token_address: resolved.token.address.clone(),
            from_token_decimals: balance.decimals,
            to_token_decimals: resolved.token.decimals,
            bridge_quote: Some(quote),
            insufficient_funds: insufficient,
            required_amount: required,
        }))
    }
}

fn bridge_steps(
    balance: &UserBalance,
    resolved: &ResolvedTarget,
    target: &RouteTarget,
    quote: &BridgeQuote,
) -> Vec<String> {
    let mut steps = vec![format!(
        "Bridge {} from {} to {} ({} transactions)",
        balance.token_symbol,
        balance.chain_name,
        resolved.chain.name,
        quote.transaction_count()
    )];
    if !balance.token_symbol.eq_ignore_ascii_case(&resolved.token.symbol) {
        steps.push(format!("Convert {} to {}", balance.token_symbol, resolved.token.symbol));
    }
    steps.push(format!(
        "Receive {} {} on {}",
        target.amount, resolved.token.symbol, resolved.chain.name
    ));
    steps
}
