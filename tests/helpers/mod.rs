// SPDX-License-Identifier: Apache-2.0

//! Test helpers for allowscan integration tests
//!
//! Mock implementations of the chain-data and explorer capabilities, so
//! the whole scan pipeline runs without sockets.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, ChainId, B256, U256};
use async_trait::async_trait;

use allowscan::errors::{ChainDataError, ExplorerError};
use allowscan::explorer::{ContractSource, ExplorerApi, ExplorerLogEntry, ExplorerTxEntry};
use allowscan::provider::ChainData;
use allowscan::types::ApprovalEvent;

/// Scripted chain state: a fixed head block, a set of historical approval
/// events, and per-token / per-pair live state.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockChainData {
    pub chain_id: ChainId,
    pub head_block: u64,
    pub events: Vec<ApprovalEvent>,
    pub symbols: HashMap<Address, String>,
    pub decimals: HashMap<Address, u8>,
    pub allowances: HashMap<(Address, Address), U256>,
    pub failing_pairs: HashSet<Address>,
    /// Artificial latency on `block_number`, for scan-race tests
    pub head_delay: Option<Duration>,
}

#[allow(dead_code)]
impl MockChainData {
    pub fn new(chain_id: ChainId, head_block: u64) -> Self {
        Self {
            chain_id,
            head_block,
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: ApprovalEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.symbols.insert(token, symbol.to_string());
        self.decimals.insert(token, decimals);
        self
    }

    /// Live allowance for (spender) on (token); keys are (token, spender).
    pub fn with_allowance(mut self, token: Address, spender: Address, amount: U256) -> Self {
        self.allowances.insert((token, spender), amount);
        self
    }

    /// Make every allowance read against this spender fail.
    pub fn with_failing_spender(mut self, spender: Address) -> Self {
        self.failing_pairs.insert(spender);
        self
    }

    pub fn with_head_delay(mut self, delay: Duration) -> Self {
        self.head_delay = Some(delay);
        self
    }
}

#[async_trait]
impl ChainData for MockChainData {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn block_number(&self) -> Result<u64, ChainDataError> {
        if let Some(delay) = self.head_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.head_block)
    }

    async fn approval_logs(
        &self,
        _owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ChainDataError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.block_number >= from_block && e.block_number <= to_block)
            .cloned()
            .collect())
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainDataError> {
        self.symbols
            .get(&token)
            .cloned()
            .ok_or_else(|| ChainDataError::call("symbol", "execution reverted"))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainDataError> {
        self.decimals
            .get(&token)
            .copied()
            .ok_or_else(|| ChainDataError::call("decimals", "execution reverted"))
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        spender: Address,
    ) -> Result<U256, ChainDataError> {
        if self.failing_pairs.contains(&spender) {
            return Err(ChainDataError::call("allowance", "execution reverted"));
        }
        Ok(self
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

/// One scripted reply from the mock explorer.
#[allow(dead_code)]
pub enum PageScript {
    Logs(Vec<ExplorerLogEntry>),
    Txs(Vec<ExplorerTxEntry>),
    RateLimited,
    Fail(&'static str),
}

/// Explorer mock replaying a scripted page sequence and counting requests.
#[allow(dead_code)]
pub struct MockExplorer {
    pages: Mutex<VecDeque<PageScript>>,
    pub requests: AtomicU64,
    pub source: Option<ContractSource>,
    pub source_calls: AtomicU64,
}

#[allow(dead_code)]
impl MockExplorer {
    pub fn scripted(pages: Vec<PageScript>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            requests: AtomicU64::new(0),
            source: None,
            source_calls: AtomicU64::new(0),
        }
    }

    pub fn with_contract_source(mut self, source: ContractSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn next_page(&self) -> Option<PageScript> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.pages.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl ExplorerApi for MockExplorer {
    async fn approval_logs(
        &self,
        _chain_id: ChainId,
        _owner: Address,
        _from_block: u64,
        _to_block: u64,
        _page: u64,
        _offset: u64,
    ) -> Result<Vec<ExplorerLogEntry>, ExplorerError> {
        match self.next_page() {
            Some(PageScript::Logs(entries)) => Ok(entries),
            Some(PageScript::RateLimited) => Err(ExplorerError::api("Max rate limit reached")),
            Some(PageScript::Fail(message)) => Err(ExplorerError::api(message)),
            Some(PageScript::Txs(_)) | None => {
                panic!("mock explorer script exhausted or mismatched")
            }
        }
    }

    async fn account_transactions(
        &self,
        _chain_id: ChainId,
        _address: Address,
        _from_block: u64,
        _to_block: u64,
        _page: u64,
        _offset: u64,
    ) -> Result<Vec<ExplorerTxEntry>, ExplorerError> {
        match self.next_page() {
            Some(PageScript::Txs(entries)) => Ok(entries),
            Some(PageScript::RateLimited) => Err(ExplorerError::api("Max rate limit reached")),
            Some(PageScript::Fail(message)) => Err(ExplorerError::api(message)),
            Some(PageScript::Logs(_)) | None => {
                panic!("mock explorer script exhausted or mismatched")
            }
        }
    }

    async fn contract_source(
        &self,
        _chain_id: ChainId,
        _address: Address,
    ) -> Result<ContractSource, ExplorerError> {
        self.source_calls.fetch_add(1, Ordering::Relaxed);
        self.source
            .clone()
            .ok_or_else(|| ExplorerError::api("no source scripted"))
    }
}

/// Shorthand for building an approval event in scripts.
#[allow(dead_code)]
pub fn approval_event(
    token: Address,
    spender: Address,
    block_number: u64,
    tx_byte: u8,
) -> ApprovalEvent {
    ApprovalEvent {
        token,
        spender,
        tx_hash: B256::repeat_byte(tx_byte),
        block_number,
        raw_amount: U256::MAX,
    }
}

/// Build a well-formed explorer log entry for an approval.
#[allow(dead_code)]
pub fn approval_log_entry(
    token: Address,
    owner: Address,
    spender: Address,
    block_number: u64,
) -> ExplorerLogEntry {
    let json = serde_json::json!({
        "address": token,
        "topics": [
            allowscan::approval_topic(),
            owner.into_word(),
            spender.into_word(),
        ],
        "data": "0x00000000000000000000000000000000000000000000000000000000000003e8",
        "blockNumber": format!("{block_number:#x}"),
        "transactionHash": B256::repeat_byte(0xab),
    });
    serde_json::from_value(json).expect("valid log entry")
}
