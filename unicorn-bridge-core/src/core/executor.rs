//! Route execution
//!
//! Dispatches the selected route either as a paced simulation or as real
//! transactions submitted strictly one after another.

use std::sync::Arc;
use std::time::Duration;
use ethers::abi::Token;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use crate::domain::entities::{
    ChainDescriptor, FlowStatus, QuoteRequest, RouteComplexity, RouteOption, RouteTarget, TokenDescriptor,
};
use crate::domain::repositories::{BalanceReader, QuoteProvider, TransactionSender};
use crate::shared::constants::{ERC20_TRANSFER_SELECTOR, SIMULATED_STEP_DELAY_MS};
use crate::shared::error::BridgeError;
use crate::shared::types::{ExecutionMode, TransactionDescriptor, TransactionHash};
use crate::shared::utils::{parse_units, short_address};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Every transaction of the route was submitted
    Submitted,
    Simulated,
    /// Fresh quote was unavailable; completed as a simulation
    BridgeUnavailable,
    /// Bridge+swap placeholder, nothing submitted
    PlaceholderSwap,
    Failed { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionReport {
    pub mode: ExecutionMode,
    pub outcome: ExecutionOutcome,
    /// Hashes in submission order, kept on failure
    pub submitted: Vec<TransactionHash>,
    pub statuses: Vec<FlowStatus>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, ExecutionOutcome::Failed { .. })
    }

    pub fn final_status(&self) -> Option<&FlowStatus> {
        self.statuses.last()
    }
}

/// Collects status updates for a report and mirrors them to a watch channel
pub struct StatusReporter {
    channel: Option<watch::Sender<FlowStatus>>,
    statuses: Vec<FlowStatus>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self {
            channel: None,
            statuses: Vec::new(),
        }
    }

    pub fn with_channel(channel: watch::Sender<FlowStatus>) -> Self {
        Self {
            channel: Some(channel),
            statuses: Vec::new(),
        }
    }

    pub fn publish(&mut self, status: FlowStatus) {
        log::debug!("Status: {}", status);
        if let Some(channel) = &self.channel {
            channel.send_replace(status.clone());
        }
        self.statuses.push(status);
    }

    pub fn statuses(&self) -> &[FlowStatus] {
        &self.statuses
    }

    fn into_statuses(self) -> Vec<FlowStatus> {
        self.statuses
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RouteExecutor {
    chains: Vec<ChainDescriptor>,
    balances: Arc<dyn BalanceReader>,
    quotes: Arc<dyn QuoteProvider>,
    sender: Arc<dyn TransactionSender>,
    step_delay: Duration,
}

impl RouteExecutor {
    pub fn new(
        chains: Vec<ChainDescriptor>,
        balances: Arc<dyn BalanceReader>,
        quotes: Arc<dyn QuoteProvider>,
        sender: Arc<dyn TransactionSender>,
    ) -> Self {
        Self {
            chains,
            balances,
            quotes,
            sender,
            step_delay: Duration::from_millis(SIMULATED_STEP_DELAY_MS),
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Run `route` towards `target`.
    ///
    /// Returns `Err` only when the route cannot be started. Anything that goes
    /// wrong after the first status is reported through the outcome.
    pub async fn execute(
        &self,
        route: &RouteOption,
        target: &RouteTarget,
        account: &str,
        mode: ExecutionMode,
        mut reporter: StatusReporter,
    ) -> Result<ExecutionReport, BridgeError> {
        if route.insufficient_funds {
            return Err(BridgeError::validation("Route has insufficient funds and cannot be executed"));
        }
        let recipient = target.recipient_or(account).to_string();
        log::info!("Executing {:?} route in {:?} mode: {}", route.complexity, mode, route.summary());

        let mut submitted = Vec::new();
        let outcome = match (mode, route.complexity) {
            (ExecutionMode::Simulate, _) => {
                self.simulate(&route.steps, &mut reporter).await;
                reporter.publish(FlowStatus::success(format!(
                    "Simulation complete: {} {} on {}",
                    route.estimated_output, route.to_token, route.to_chain
                )));
                ExecutionOutcome::Simulated
            }
            (ExecutionMode::Real, RouteComplexity::Simple) => {
                self.execute_transfer(route, target, account, &recipient, &mut submitted, &mut reporter)
                    .await
            }
            (ExecutionMode::Real, RouteComplexity::Bridge) => {
                self.execute_bridge(route, target, account, &recipient, &mut submitted, &mut reporter)
                    .await
            }
            (ExecutionMode::Real, RouteComplexity::Complex) => {
                log::warn!("Bridge+swap execution is not production-ready; running placeholder simulation");
                self.simulate(&route.steps, &mut reporter).await;
                reporter.publish(FlowStatus::success(
                    "Swap leg is not implemented; completed as a placeholder simulation",
                ));
                ExecutionOutcome::PlaceholderSwap
            }
        };

        Ok(ExecutionReport {
            mode,
            outcome,
            submitted,
            statuses: reporter.into_statuses(),
        })
    }

    async fn simulate(&self, steps: &[String], reporter: &mut StatusReporter) {
        let total = steps.len();
        for (i, step) in steps.iter().enumerate() {
            reporter.publish(FlowStatus::executing(format!("Step {}/{}: {}", i + 1, total, step)));
            tokio::time::sleep(self.step_delay).await;
        }
    }

    async fn execute_transfer(
        &self,
        route: &RouteOption,
        target: &RouteTarget,
        account: &str,
        recipient: &str,
        submitted: &mut Vec<TransactionHash>,
        reporter: &mut StatusReporter,
    ) -> ExecutionOutcome {
        match self.transfer(route, target, account, recipient, reporter).await {
            Ok(hash) => {
                reporter.publish(FlowStatus::success(format!("Transfer submitted: {}", hash)));
                submitted.push(hash);
                ExecutionOutcome::Submitted
            }
            Err(e) => fail(e, reporter),
        }
    }

    async fn transfer(
        &self,
        route: &RouteOption,
        target: &RouteTarget,
        account: &str,
        recipient: &str,
        reporter: &mut StatusReporter,
    ) -> Result<TransactionHash, BridgeError> {
        let amount = parse_units(&target.amount, route.from_token_decimals)?;
        let chain = self.chain(route.from_chain_id)?;
        let token = TokenDescriptor::new(
            route.from_token_address.clone(),
            route.from_token.clone(),
            route.from_token_decimals,
        );

        // Balances may have moved since the route was found
        reporter.publish(FlowStatus::executing(format!("Checking {} balance on {}", token.symbol, chain.name)));
        let available = self.balances.balance_of(chain, &token, account).await?;
        if available < amount {
            return Err(BridgeError::validation(format!(
                "Insufficient {} balance on {}",
                token.symbol, chain.name
            )));
        }

        let transaction = transfer_transaction(chain.id, &token, recipient, amount)?;
        reporter.publish(FlowStatus::executing(format!(
            "Sending {} {} to {}",
            target.amount,
            token.symbol,
            short_address(recipient)
        )));
        self.sender.send_transaction(&transaction).await
    }

    async fn execute_bridge(
        &self,
        route: &RouteOption,
        target: &RouteTarget,
        account: &str,
        recipient: &str,
        submitted: &mut Vec<TransactionHash>,
        reporter: &mut StatusReporter,
    ) -> ExecutionOutcome {
        let amount = match parse_units(&target.amount, route.to_token_decimals) {
            Ok(amount) => amount,
            Err(e) => return fail(e, reporter),
        };
        let request = QuoteRequest {
            origin_chain_id: route.from_chain_id,
            origin_token_address: route.from_token_address.clone(),
            destination_chain_id: route.to_chain_id,
            destination_token_address: route.to_token_address.clone(),
            amount: amount.to_string(),
            sender: account.to_string(),
            receiver: recipient.to_string(),
        };

        reporter.publish(FlowStatus::executing("Requesting fresh bridge quote"));
        let quote = match self.quotes.prepare_buy(&request).await {
            Ok(quote) if quote.is_executable() => quote,
            Ok(_) | Err(_) => {
                log::warn!("Bridge quote unavailable at execution time; simulating instead");
                self.simulate(&route.steps, reporter).await;
                reporter.publish(FlowStatus::success("Bridge unavailable; completed as a simulation"));
                return ExecutionOutcome::BridgeUnavailable;
            }
        };

        let steps = quote.steps.len();
        for (i, step) in quote.steps.iter().enumerate() {
            let count = step.transactions.len();
            for (j, transaction) in step.transactions.iter().enumerate() {
                let label = transaction.action.as_deref().or(step.action.as_deref()).unwrap_or("transaction");
                reporter.publish(FlowStatus::executing(format!(
                    "Step {}/{}: {} {}/{}",
                    i + 1,
                    steps,
                    label,
                    j + 1,
                    count
                )));
                match self.sender.send_transaction(transaction).await {
                    Ok(hash) => {
                        log::info!("Submitted {} on chain {}", hash, transaction.chain_id);
                        submitted.push(hash);
                    }
                    Err(e) => return fail(e, reporter),
                }
            }
        }

        reporter.publish(FlowStatus::success(format!(
            "Bridge submitted: {} transactions towards {} {} on {}",
            submitted.len(),
            target.amount,
            route.to_token,
            route.to_chain
        )));
        ExecutionOutcome::Submitted
    }

    fn chain(&self, id: u64) -> Result<&ChainDescriptor, BridgeError> {
        self.chains
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| BridgeError::config(format!("Chain {} is not configured", id)))
    }
}

fn fail(error: BridgeError, reporter: &mut StatusReporter) -> ExecutionOutcome {
    let message = error.user_message();
    log::error!("Route execution failed: {}", error);
    reporter.publish(FlowStatus::error(message.clone()));
    ExecutionOutcome::Failed { message }
}

/// Native value transfer or ERC20 `transfer(recipient, amount)`
pub fn transfer_transaction(
    chain_id: u64,
    token: &TokenDescriptor,
    recipient: &str,
    amount: U256,
) -> Result<TransactionDescriptor, BridgeError> {
    if token.is_native() {
        return Ok(TransactionDescriptor::new(chain_id, recipient)
            .with_value(amount.to_string())
            .with_action("transfer"));
    }

    let to: ethers::types::Address = recipient
        .parse()
        .map_err(|e| BridgeError::validation(format!("Invalid recipient {}: {}", recipient, e)))?;
    let mut calldata = ERC20_TRANSFER_SELECTOR.to_vec();
    calldata.extend(ethers::abi::encode(&[Token::Address(to), Token::Uint(amount)]));

    Ok(TransactionDescriptor::new(chain_id, token.address.clone())
        .with_value("0")
        .with_data(format!("0x{}", hex::encode(calldata)))
        .with_action("transfer"))
}
