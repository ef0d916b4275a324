// SPDX-License-Identifier: Apache-2.0

//! Token metadata and spender-name resolution.

use std::sync::Arc;

use alloy_primitives::{Address, ChainId, U256};
use tracing::{debug, warn};

use crate::cache::ContractSourceCache;
use crate::errors::ChainDataError;
use crate::explorer::ExplorerApi;
use crate::provider::ChainData;
use crate::types::{TokenDecimals, TokenInfo};

/// Resolves token identity and live allowances through the chain capability.
pub struct TokenMetadataResolver {
    chain: Arc<dyn ChainData>,
}

impl TokenMetadataResolver {
    /// Create a resolver over the given chain capability.
    pub fn new(chain: Arc<dyn ChainData>) -> Self {
        Self { chain }
    }

    /// Resolve a token's symbol and decimals. Never fails: each read falls
    /// back independently (`"UNKNOWN"`, 18) so a token missing `decimals()`
    /// still reports its real symbol and vice versa. The two reads run
    /// concurrently.
    pub async fn resolve_token(&self, token: Address) -> TokenInfo {
        let (symbol, decimals) = futures::future::join(
            self.chain.token_symbol(token),
            self.chain.token_decimals(token),
        )
        .await;

        let symbol = match symbol {
            Ok(symbol) => symbol,
            Err(error) => {
                warn!(%token, error = %error, "symbol() failed, using fallback");
                TokenInfo::UNKNOWN_SYMBOL.to_string()
            }
        };
        let decimals = match decimals {
            Ok(decimals) => TokenDecimals::new(decimals),
            Err(error) => {
                warn!(%token, error = %error, "decimals() failed, using fallback");
                TokenDecimals::FALLBACK
            }
        };

        TokenInfo::new(token, symbol, decimals)
    }

    /// Read the live allowance for one (token, owner, spender) triple.
    ///
    /// Always hits the chain; historical events are not truth about current
    /// allowances, so this is the correctness-critical read and is never
    /// cached.
    pub async fn current_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainDataError> {
        self.chain.allowance(token, owner, spender).await
    }
}

/// Resolves human-readable spender names from verified contract sources,
/// cache-first.
///
/// Both positive results and definitive "not verified" answers are cached
/// for the TTL, so a scan does not re-query the explorer for the same
/// spender over and over. Transient explorer failures are not cached.
pub struct SpenderDirectory {
    api: Arc<dyn ExplorerApi>,
    cache: ContractSourceCache,
}

impl SpenderDirectory {
    /// Create a directory over an explorer client and a cache.
    pub fn new(api: Arc<dyn ExplorerApi>, cache: ContractSourceCache) -> Self {
        Self { api, cache }
    }

    /// Verified contract name for a spender, or `None` when unverified or
    /// unreachable.
    pub async fn resolve_name(&self, spender: Address, chain_id: ChainId) -> Option<String> {
        if let Some(cached) = self.cache.get(spender, chain_id) {
            debug!(%spender, chain_id, "Spender name served from cache");
            return cached.contract_name;
        }

        match self.api.contract_source(chain_id, spender).await {
            Ok(source) => {
                self.cache.set(spender, chain_id, source.clone());
                source.contract_name
            }
            Err(error) => {
                warn!(%spender, chain_id, error = %error, "Contract source lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::cache::MemoryStorage;
    use crate::errors::ExplorerError;
    use crate::explorer::{ContractSource, ExplorerLogEntry, ExplorerTxEntry};

    struct CountingExplorer {
        calls: AtomicU32,
        source: Result<ContractSource, ()>,
    }

    #[async_trait]
    impl ExplorerApi for CountingExplorer {
        async fn approval_logs(
            &self,
            _chain_id: ChainId,
            _owner: Address,
            _from_block: u64,
            _to_block: u64,
            _page: u64,
            _offset: u64,
        ) -> Result<Vec<ExplorerLogEntry>, ExplorerError> {
            unimplemented!("not used by the directory")
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
            unimplemented!("not used by the directory")
        }

        async fn contract_source(
            &self,
            _chain_id: ChainId,
            _address: Address,
        ) -> Result<ContractSource, ExplorerError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.source
                .clone()
                .map_err(|_| ExplorerError::api("unreachable"))
        }
    }

    fn directory(source: Result<ContractSource, ()>) -> (Arc<CountingExplorer>, SpenderDirectory) {
        let api = Arc::new(CountingExplorer {
            calls: AtomicU32::new(0),
            source,
        });
        let cache = ContractSourceCache::new(Box::new(MemoryStorage::new()));
        (api.clone(), SpenderDirectory::new(api, cache))
    }

    #[tokio::test]
    async fn test_positive_result_cached() {
        let spender = address!("1111111111111111111111111111111111111111");
        let (api, directory) = directory(Ok(ContractSource::verified("Router")));

        assert_eq!(
            directory.resolve_name(spender, 1).await.as_deref(),
            Some("Router")
        );
        assert_eq!(
            directory.resolve_name(spender, 1).await.as_deref(),
            Some("Router")
        );
        // Second resolve hit the cache
        assert_eq!(api.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_negative_result_cached() {
        let spender = address!("1111111111111111111111111111111111111111");
        let (api, directory) = directory(Ok(ContractSource::unverified()));

        assert!(directory.resolve_name(spender, 1).await.is_none());
        assert!(directory.resolve_name(spender, 1).await.is_none());
        assert_eq!(api.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_not_cached() {
        let spender = address!("1111111111111111111111111111111111111111");
        let (api, directory) = directory(Err(()));

        assert!(directory.resolve_name(spender, 1).await.is_none());
        assert!(directory.resolve_name(spender, 1).await.is_none());
        // Both resolves reached the explorer; failures must be retried later
        assert_eq!(api.calls.load(Ordering::Relaxed), 2);
    }
}
