//! Test utilities
//!
//! In-memory fakes for the repository traits, shared by the crate's own tests
//! and by downstream crates through the `test-utils` feature.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use ethers::types::U256;
use crate::domain::entities::{BridgeQuote, ChainDescriptor, QuoteRequest, QuoteStep, TokenDescriptor};
use crate::domain::repositories::{AccountProvider, BalanceReader, QuoteProvider, TransactionSender};
use crate::shared::error::BridgeError;
use crate::shared::types::{Address, ChainId, TransactionDescriptor, TransactionHash};

pub const TEST_ACCOUNT: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";
pub const OTHER_ACCOUNT: &str = "0x2222222222222222222222222222222222222222";

fn key(address: &str, chain_id: ChainId) -> (ChainId, String) {
    (chain_id, address.to_ascii_lowercase())
}

/// Balances keyed by (chain, token address). Unknown pairs read as zero.
#[derive(Default)]
pub struct StaticBalanceReader {
    balances: Mutex<HashMap<(ChainId, String), U256>>,
    failing: Mutex<HashSet<(ChainId, String)>>,
    reads: Mutex<usize>,
}

impl StaticBalanceReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, token_address: &str, chain_id: ChainId, amount: U256) -> Self {
        self.set_balance(token_address, chain_id, amount);
        self
    }

    pub fn failing_on(self, token_address: &str, chain_id: ChainId) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(key(token_address, chain_id));
        }
        self
    }

    pub fn set_balance(&self, token_address: &str, chain_id: ChainId, amount: U256) {
        if let Ok(mut balances) = self.balances.lock() {
            balances.insert(key(token_address, chain_id), amount);
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().map(|r| *r).unwrap_or_default()
    }

    fn read(&self, token_address: &str, chain_id: ChainId) -> Result<U256, BridgeError> {
        if let Ok(mut reads) = self.reads.lock() {
            *reads += 1;
        }
        let k = key(token_address, chain_id);
        let failing = self.failing.lock().map_err(|_| BridgeError::internal("lock poisoned"))?;
        if failing.contains(&k) {
            return Err(BridgeError::network(format!("RPC unreachable for {}", token_address)));
        }
        let balances = self.balances.lock().map_err(|_| BridgeError::internal("lock poisoned"))?;
        Ok(balances.get(&k).copied().unwrap_or_default())
    }
}

#[async_trait]
impl BalanceReader for StaticBalanceReader {
    async fn native_balance(&self, chain: &ChainDescriptor, _owner: &str) -> Result<U256, BridgeError> {
        self.read(crate::shared::constants::NATIVE_TOKEN_ADDRESS, chain.id)
    }

    async fn token_balance(
        &self,
        chain: &ChainDescriptor,
        token: &TokenDescriptor,
        _owner: &str,
    ) -> Result<U256, BridgeError> {
        self.read(&token.address, chain.id)
    }
}

/// Quote provider answering from a queue, then from a fallback response.
/// Clones share state so a test can inspect the recorded requests.
#[derive(Clone, Default)]
pub struct ScriptedQuoteProvider {
    queued: Arc<Mutex<VecDeque<Result<BridgeQuote, BridgeError>>>>,
    fallback: Arc<Mutex<Option<Result<BridgeQuote, BridgeError>>>>,
    requests: Arc<Mutex<Vec<QuoteRequest>>>,
}

impl ScriptedQuoteProvider {
    /// Without a script every call fails
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(self, quote: BridgeQuote) -> Self {
        if let Ok(mut fallback) = self.fallback.lock() {
            *fallback = Some(Ok(quote));
        }
        self
    }

    pub fn failing(self) -> Self {
        if let Ok(mut fallback) = self.fallback.lock() {
            *fallback = Some(Err(BridgeError::network("quote service unreachable")));
        }
        self
    }

    /// Answer the next call with `response`
    pub fn push(&self, response: Result<BridgeQuote, BridgeError>) {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(response);
        }
    }

    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl QuoteProvider for ScriptedQuoteProvider {
    async fn prepare_buy(&self, request: &QuoteRequest) -> Result<BridgeQuote, BridgeError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(next) = self.queued.lock().ok().and_then(|mut q| q.pop_front()) {
            return next;
        }
        self.fallback
            .lock()
            .ok()
            .and_then(|f| f.clone())
            .unwrap_or_else(|| Err(BridgeError::quote("no scripted quote")))
    }
}

/// Quote whose steps carry `counts[i]` transactions each.
///
/// Transaction data encodes `(step, index)` so submission order is visible.
pub fn executable_quote(from_amount: Option<&str>, to_amount: Option<&str>, counts: &[usize]) -> BridgeQuote {
    let steps = counts
        .iter()
        .enumerate()
        .map(|(step, count)| QuoteStep {
            transactions: (0..*count)
                .map(|i| {
                    TransactionDescriptor::new(1, OTHER_ACCOUNT)
                        .with_data(format!("0x{:02x}{:02x}", step, i))
                        .with_value("0")
                })
                .collect(),
            action: Some("bridge".to_string()),
            extra: serde_json::Map::new(),
        })
        .collect();

    BridgeQuote {
        steps,
        from_amount: from_amount.map(str::to_string),
        to_amount: to_amount.map(str::to_string),
        extra: serde_json::Map::new(),
    }
}

/// Sender that records every descriptor and can fail on the n-th call
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<TransactionDescriptor>>>,
    fail_at: Option<usize>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based index of the call that fails
    pub fn failing_at(index: usize) -> Self {
        Self {
            sent: Arc::default(),
            fail_at: Some(index),
        }
    }

    pub fn sent(&self) -> Vec<TransactionDescriptor> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TransactionSender for RecordingSender {
    async fn send_transaction(&self, transaction: &TransactionDescriptor) -> Result<TransactionHash, BridgeError> {
        let mut sent = self.sent.lock().map_err(|_| BridgeError::internal("lock poisoned"))?;
        let index = sent.len();
        if self.fail_at == Some(index) {
            return Err(BridgeError::transaction("execution reverted"));
        }
        sent.push(transaction.clone());
        Ok(format!("0x{:064x}", index + 1))
    }
}

/// Account provider returning a fixed address, optionally after a delay
#[derive(Clone)]
pub struct StaticAccount {
    address: Option<Address>,
    delay: std::time::Duration,
}

impl StaticAccount {
    pub fn new(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            delay: std::time::Duration::ZERO,
        }
    }

    /// Provider whose wallet never yields an account
    pub fn unavailable() -> Self {
        Self {
            address: None,
            delay: std::time::Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl AccountProvider for StaticAccount {
    async fn connect(&self) -> Result<Address, BridgeError> {
        tokio::time::sleep(self.delay).await;
        self.address
            .clone()
            .ok_or_else(|| BridgeError::no_account("Wallet returned no account"))
    }
}

/// What a one-shot test server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request line and headers
    pub head: String,
    /// Parsed JSON body, `Null` when empty
    pub body: serde_json::Value,
}

/// Serve `response` as JSON to exactly one HTTP request on a loopback port.
///
/// Returns the base URL and a handle resolving to the recorded request.
pub async fn serve_json_once(
    response: serde_json::Value,
) -> (String, tokio::task::JoinHandle<RecordedRequest>) {
    serve_once(200, response).await
}

pub async fn serve_once(
    status: u16,
    response: serde_json::Value,
) -> (String, tokio::task::JoinHandle<RecordedRequest>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let (head, body_start, body_len) = loop {
            let n = socket.read(&mut chunk).await.expect("read");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_string();
                let len = head
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break (head, pos + 4, len);
                }
            }
            assert!(n > 0, "connection closed before request completed");
        };
        let raw_body = &buf[body_start..body_start + body_len];
        let body = serde_json::from_slice(raw_body).unwrap_or(serde_json::Value::Null);

        let payload = response.to_string();
        let reply = format!(
            "HTTP/1.1 {} OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            payload.len(),
            payload
        );
        socket.write_all(reply.as_bytes()).await.expect("write");
        let _ = socket.shutdown().await;
        RecordedRequest { head, body }
    });

    (format!("http://{}", addr), handle)
}
