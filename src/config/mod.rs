// SPDX-License-Identifier: Apache-2.0

//! Configuration for allowance scans
//!
//! Controls the event-source strategy, log chunking, explorer pagination
//! and retry behavior, RPC pool failover budgets, and per-chain endpoint
//! overrides. Use [`ScannerConfigBuilder`] for a fluent API.
//!
//! # Example
//!
//! ```rust
//! use allowscan::{ScannerConfig, ScannerConfigBuilder, EventSourceStrategy};
//! use std::time::Duration;
//!
//! // Defaults: RPC log scanning, 5000-block chunks, 1M-block window
//! let config = ScannerConfig::default();
//!
//! // Custom: explorer-backed scanning with a tighter window
//! let config = ScannerConfigBuilder::with_defaults()
//!     .strategy(EventSourceStrategy::ExplorerLogs)
//!     .explorer_api_key("YourApiKeyToken")
//!     .default_scan_window(60_000)
//!     .scan_timeout(Duration::from_secs(120))
//!     .build();
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use alloy_primitives::ChainId;

use crate::types::ChunkSize;

pub mod constants;

/// Which historical approval source feeds the scan
///
/// All strategies produce the same [`ApprovalEvent`](crate::ApprovalEvent)
/// stream; they differ in where the history comes from and what they cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventSourceStrategy {
    /// `eth_getLogs` against the rotating RPC pool, chunked by block range.
    /// Needs no API key.
    #[default]
    RpcLogs,
    /// Block-explorer `logs.getLogs` endpoint, paginated. Needs an API key.
    ExplorerLogs,
    /// Block-explorer `account.txlist` endpoint, paginated, keeping only
    /// `approve(...)` calls. Needs an API key; also finds approvals on
    /// tokens whose logs the explorer has not indexed.
    ExplorerTransactions,
}

/// Per-chain endpoint overrides
#[derive(Debug, Clone, Default)]
pub struct ChainEndpoints {
    /// Read-only RPC endpoint URLs, tried in rotation
    pub rpc_urls: Vec<String>,
    /// Block explorer base URL for outbound links
    pub explorer_url: Option<String>,
}

/// Configuration for the allowance scanner
///
/// Construct via [`Default`] or [`ScannerConfigBuilder`].
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Historical event source strategy
    pub strategy: EventSourceStrategy,
    /// Block span per `eth_getLogs` query
    pub log_chunk_size: ChunkSize,
    /// Page size for explorer log queries
    pub explorer_log_page_size: u64,
    /// Page size for explorer transaction-list queries
    pub explorer_tx_page_size: u64,
    /// Per-page retry bound for explorer fetches
    pub explorer_page_retries: u32,
    /// Base delay for linear backoff on rate-limited explorer pages
    pub explorer_retry_base_delay: Duration,
    /// Pause between successive explorer pages
    pub explorer_page_delay: Duration,
    /// Attempts per endpoint before the RPC pool reports exhaustion
    pub pool_retries_per_endpoint: u32,
    /// Minimum spacing between requests to a single pooled endpoint
    pub endpoint_min_interval: Option<Duration>,
    /// Blocks scanned when the caller gives neither a start block nor a range
    pub default_scan_window: u64,
    /// Overall wall-clock bound for one scan (off by default)
    pub scan_timeout: Option<Duration>,
    /// Explorer API key; required by the explorer-backed strategies and by
    /// spender-name resolution
    pub explorer_api_key: Option<String>,
    /// Time-to-live for cached contract-source lookups
    pub contract_source_ttl: Duration,
    /// Path of the persisted contract-source cache; in-memory when unset
    pub cache_path: Option<PathBuf>,
    /// Per-chain endpoint overrides, consulted before the built-in tables
    chain_overrides: HashMap<ChainId, ChainEndpoints>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            strategy: EventSourceStrategy::default(),
            log_chunk_size: constants::DEFAULT_LOG_CHUNK,
            explorer_log_page_size: constants::EXPLORER_LOG_PAGE_SIZE,
            explorer_tx_page_size: constants::EXPLORER_TX_PAGE_SIZE,
            explorer_page_retries: constants::EXPLORER_PAGE_RETRIES,
            explorer_retry_base_delay: constants::EXPLORER_RETRY_BASE_DELAY,
            explorer_page_delay: constants::EXPLORER_PAGE_DELAY,
            pool_retries_per_endpoint: constants::POOL_RETRIES_PER_ENDPOINT,
            endpoint_min_interval: None,
            default_scan_window: constants::DEFAULT_SCAN_WINDOW,
            scan_timeout: None,
            explorer_api_key: None,
            contract_source_ttl: constants::CONTRACT_SOURCE_TTL,
            cache_path: None,
            chain_overrides: HashMap::new(),
        }
    }
}

impl ScannerConfig {
    /// RPC endpoints for a chain: the override when present, otherwise the
    /// built-in table. `None` means the chain is not configured at all,
    /// which is fatal to a scan.
    pub fn endpoints_for(&self, chain_id: ChainId) -> Option<Vec<String>> {
        if let Some(overrides) = self.chain_overrides.get(&chain_id) {
            if !overrides.rpc_urls.is_empty() {
                return Some(overrides.rpc_urls.clone());
            }
        }
        constants::default_endpoints(chain_id)
            .map(|urls| urls.iter().map(|u| (*u).to_string()).collect())
    }

    /// Explorer base URL for a chain, override-first.
    pub fn explorer_url_for(&self, chain_id: ChainId) -> Option<String> {
        if let Some(overrides) = self.chain_overrides.get(&chain_id) {
            if let Some(url) = &overrides.explorer_url {
                return Some(url.clone());
            }
        }
        constants::default_explorer_url(chain_id).map(str::to_string)
    }

    /// Install or replace the endpoint override for a chain.
    pub fn set_chain_endpoints(&mut self, chain_id: ChainId, endpoints: ChainEndpoints) {
        self.chain_overrides.insert(chain_id, endpoints);
    }
}

/// Builder for [`ScannerConfig`]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl Default for ScannerConfigBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ScannerConfigBuilder {
    /// Start from the built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Select the historical event source.
    pub fn strategy(mut self, strategy: EventSourceStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the block span per `eth_getLogs` query.
    pub fn log_chunk_size(mut self, blocks: u64) -> Self {
        self.config.log_chunk_size = ChunkSize::new(blocks);
        self
    }

    /// Set the explorer API key.
    pub fn explorer_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.explorer_api_key = Some(key.into());
        self
    }

    /// Set the default scan window in blocks.
    pub fn default_scan_window(mut self, blocks: u64) -> Self {
        self.config.default_scan_window = blocks;
        self
    }

    /// Bound the wall-clock duration of one scan.
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.config.scan_timeout = Some(timeout);
        self
    }

    /// Set the per-page retry bound for explorer fetches.
    pub fn explorer_page_retries(mut self, retries: u32) -> Self {
        self.config.explorer_page_retries = retries;
        self
    }

    /// Set the base delay for linear backoff on rate-limited pages.
    pub fn explorer_retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.explorer_retry_base_delay = delay;
        self
    }

    /// Set the pause between successive explorer pages.
    pub fn explorer_page_delay(mut self, delay: Duration) -> Self {
        self.config.explorer_page_delay = delay;
        self
    }

    /// Set the per-endpoint attempt count for the RPC pool.
    pub fn pool_retries_per_endpoint(mut self, retries: u32) -> Self {
        self.config.pool_retries_per_endpoint = retries;
        self
    }

    /// Enforce a minimum spacing between requests to each pooled endpoint.
    pub fn endpoint_min_interval(mut self, interval: Duration) -> Self {
        self.config.endpoint_min_interval = Some(interval);
        self
    }

    /// Persist the contract-source cache at this path.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache_path = Some(path.into());
        self
    }

    /// Set the contract-source cache time-to-live.
    pub fn contract_source_ttl(mut self, ttl: Duration) -> Self {
        self.config.contract_source_ttl = ttl;
        self
    }

    /// Override the RPC endpoints for one chain.
    pub fn chain_rpc_urls(
        mut self,
        chain_id: ChainId,
        urls: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let entry = self.config.chain_overrides.entry(chain_id).or_default();
        entry.rpc_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Override the explorer base URL for one chain.
    pub fn chain_explorer_url(mut self, chain_id: ChainId, url: impl Into<String>) -> Self {
        let entry = self.config.chain_overrides.entry(chain_id).or_default();
        entry.explorer_url = Some(url.into());
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> ScannerConfig {
        self.config
    }
}
