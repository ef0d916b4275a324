// SPDX-License-Identifier: Apache-2.0

//! The allowance scanner: event fetch, reconciliation, and formatting
//!
//! A scan is a sequential async pipeline: pull historical approval events
//! for the block range, deduplicate them into a token → spender set, then
//! re-read the *live* allowance for every pair and keep only the non-zero
//! ones. The live read is what makes the output trustworthy: most
//! historical approvals have long since been consumed or revoked, and the
//! zero filter is the primary signal-to-noise cut.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use tracing::{info, warn};

use crate::amount::format_allowance;
use crate::cache::{CacheStorage, ContractSourceCache, FileStorage, MemoryStorage};
use crate::config::{constants, EventSourceStrategy, ScannerConfig};
use crate::errors::ScanError;
use crate::events::{
    ApprovalEventSource, ExplorerLogSource, ExplorerTxSource, RpcLogSource,
};
use crate::explorer::{EtherscanClient, ExplorerApi};
use crate::metadata::{SpenderDirectory, TokenMetadataResolver};
use crate::provider::{ChainData, PooledChainData, RpcPool};
use crate::types::{AllowanceInfo, ScanOptions, TokenApprovalSet};

/// Discovers every outstanding non-zero allowance a wallet has granted.
///
/// Built either directly from capabilities (useful in tests) or via
/// [`AllowanceScanner::from_config`] for the full production wiring.
///
/// # Examples
///
/// ```rust,ignore
/// use allowscan::{AllowanceScanner, ScannerConfig, ScanOptions};
///
/// let scanner = AllowanceScanner::from_config(&ScannerConfig::default(), 1)?;
/// let allowances = scanner
///     .scan_wallet_allowances(wallet, ScanOptions::default())
///     .await?;
/// for record in &allowances {
///     println!("{} -> {}: {}", record.token.symbol, record.spender, record.formatted_allowance);
/// }
/// ```
pub struct AllowanceScanner {
    chain: Arc<dyn ChainData>,
    source: Arc<dyn ApprovalEventSource>,
    resolver: TokenMetadataResolver,
    spender_names: Option<SpenderDirectory>,
    explorer_link: Option<String>,
    default_scan_window: u64,
    scan_timeout: Option<Duration>,
    generation: AtomicU64,
}

impl AllowanceScanner {
    /// Assemble a scanner from a chain capability and an event source.
    pub fn new(chain: Arc<dyn ChainData>, source: Arc<dyn ApprovalEventSource>) -> Self {
        Self {
            resolver: TokenMetadataResolver::new(chain.clone()),
            chain,
            source,
            spender_names: None,
            explorer_link: None,
            default_scan_window: constants::DEFAULT_SCAN_WINDOW,
            scan_timeout: None,
            generation: AtomicU64::new(0),
        }
    }

    /// Full production wiring for one chain: RPC pool, the configured
    /// event-source strategy, explorer links, and (when an API key is
    /// present) cached spender-name resolution.
    ///
    /// # Errors
    ///
    /// Fails fast, before any network call, when the chain has no endpoint
    /// configuration or an explorer-backed strategy lacks an API key.
    pub fn from_config(
        config: &ScannerConfig,
        chain_id: alloy_primitives::ChainId,
    ) -> Result<Self, ScanError> {
        let pool = RpcPool::for_chain(config, chain_id)
            .map_err(crate::errors::ChainDataError::from)?;
        let chain: Arc<dyn ChainData> = Arc::new(PooledChainData::new(pool));

        let source: Arc<dyn ApprovalEventSource> = match config.strategy {
            EventSourceStrategy::RpcLogs => {
                Arc::new(RpcLogSource::new(chain.clone(), config.log_chunk_size))
            }
            EventSourceStrategy::ExplorerLogs => Arc::new(ExplorerLogSource::new(
                explorer_client(config)?,
                chain_id,
                config,
            )),
            EventSourceStrategy::ExplorerTransactions => Arc::new(ExplorerTxSource::new(
                explorer_client(config)?,
                chain_id,
                config,
            )),
        };

        let mut scanner = Self::new(chain, source).with_scan_window(config.default_scan_window);

        if let Some(timeout) = config.scan_timeout {
            scanner = scanner.with_timeout(timeout);
        }
        if let Some(url) = config.explorer_url_for(chain_id) {
            scanner = scanner.with_explorer_link(url);
        }
        if let Some(key) = &config.explorer_api_key {
            let storage: Box<dyn CacheStorage> = match &config.cache_path {
                Some(path) => Box::new(FileStorage::new(path)),
                None => Box::new(MemoryStorage::new()),
            };
            let cache =
                ContractSourceCache::new(storage).with_ttl(config.contract_source_ttl);
            let api: Arc<dyn ExplorerApi> = Arc::new(EtherscanClient::new(key.clone()));
            scanner = scanner.with_spender_directory(SpenderDirectory::new(api, cache));
        }

        Ok(scanner)
    }

    /// Attach cached spender-name resolution.
    pub fn with_spender_directory(mut self, directory: SpenderDirectory) -> Self {
        self.spender_names = Some(directory);
        self
    }

    /// Attach the explorer base URL carried on every result.
    pub fn with_explorer_link(mut self, url: impl Into<String>) -> Self {
        self.explorer_link = Some(url.into());
        self
    }

    /// Set the default scan window in blocks.
    pub fn with_scan_window(mut self, blocks: u64) -> Self {
        self.default_scan_window = blocks;
        self
    }

    /// Bound the wall-clock duration of one scan.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = Some(timeout);
        self
    }

    /// Scan a wallet and return its outstanding non-zero allowances,
    /// sorted by token symbol.
    ///
    /// Starting a new scan supersedes any in-flight one: the older scan
    /// finishes its network work but its results are discarded with
    /// [`ScanError::Superseded`] instead of racing the newer scan's.
    pub async fn scan_wallet_allowances(
        &self,
        owner: Address,
        options: ScanOptions,
    ) -> Result<Vec<AllowanceInfo>, ScanError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = match self.scan_timeout {
            Some(bound) => tokio::time::timeout(bound, self.run_scan(owner, options))
                .await
                .map_err(|_| ScanError::Timeout {
                    seconds: bound.as_secs(),
                })?,
            None => self.run_scan(owner, options).await,
        }?;

        if self.generation.load(Ordering::SeqCst) != generation {
            info!(%owner, "Discarding results of superseded scan");
            return Err(ScanError::Superseded);
        }
        Ok(result)
    }

    async fn run_scan(
        &self,
        owner: Address,
        options: ScanOptions,
    ) -> Result<Vec<AllowanceInfo>, ScanError> {
        let current_block = self.chain.block_number().await?;
        let (from_block, to_block) =
            resolve_range(options, current_block, self.default_scan_window);

        info!(
            %owner,
            chain_id = self.chain.chain_id(),
            from_block,
            to_block,
            "Starting allowance scan"
        );

        let events = self.source.fetch_approvals(owner, from_block, to_block).await?;
        let approvals = TokenApprovalSet::from_events(events);

        info!(
            tokens = approvals.token_count(),
            pairs = approvals.pair_count(),
            "Reconciling historical approvals against live allowances"
        );

        let mut results = self.collect_allowances(owner, &approvals).await;
        results.sort_by(|a, b| a.token.symbol.cmp(&b.token.symbol));

        info!(active = results.len(), "Finished allowance scan");
        Ok(results)
    }

    /// Reconcile the deduplicated approval set against live chain state.
    ///
    /// Metadata is resolved once per token and amortized over its
    /// spenders. A failing pair is logged and skipped; one broken token
    /// contract must not sink the rest of the batch.
    async fn collect_allowances(
        &self,
        owner: Address,
        approvals: &TokenApprovalSet,
    ) -> Vec<AllowanceInfo> {
        let chain_id = self.chain.chain_id();
        let mut results = Vec::new();

        for (token, spenders) in approvals.iter() {
            let token_info = self.resolver.resolve_token(*token).await;

            for (spender, tx_hash) in spenders {
                let allowance = match self
                    .resolver
                    .current_allowance(*token, owner, *spender)
                    .await
                {
                    Ok(allowance) => allowance,
                    Err(error) => {
                        warn!(
                            %token,
                            %spender,
                            error = %error,
                            "Skipping pair, allowance read failed"
                        );
                        continue;
                    }
                };

                if allowance.is_zero() {
                    continue;
                }

                let spender_name = match &self.spender_names {
                    Some(directory) => directory.resolve_name(*spender, chain_id).await,
                    None => None,
                };

                results.push(AllowanceInfo {
                    formatted_allowance: format_allowance(
                        allowance,
                        token_info.decimals,
                        &token_info.symbol,
                    ),
                    token: token_info.clone(),
                    spender: *spender,
                    allowance: allowance.to_string(),
                    tx_hash: *tx_hash,
                    explorer_link: self.explorer_link.clone(),
                    spender_name,
                });
            }
        }

        results
    }
}

/// Turn scan options into a concrete inclusive block range.
///
/// `block_range` means "the most recent N blocks" and only applies when no
/// explicit start block was given.
fn resolve_range(options: ScanOptions, current_block: u64, default_window: u64) -> (u64, u64) {
    let to_block = options.to_block.unwrap_or(current_block);
    let window = options.block_range.unwrap_or(default_window);
    let from_block = options
        .from_block
        .unwrap_or_else(|| to_block.saturating_sub(window));
    (from_block, to_block)
}

fn explorer_client(config: &ScannerConfig) -> Result<Arc<dyn ExplorerApi>, ScanError> {
    let key = config
        .explorer_api_key
        .as_ref()
        .ok_or_else(|| ScanError::missing_configuration("explorer_api_key"))?;
    Ok(Arc::new(EtherscanClient::new(key.clone())))
}
