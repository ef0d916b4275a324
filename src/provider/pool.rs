// SPDX-License-Identifier: Apache-2.0

//! Rotating multi-endpoint RPC pool
//!
//! Public RPC endpoints fail individually and often; the pool holds every
//! configured endpoint for one chain and rotates a shared cursor across
//! them. Any failure advances the cursor and retries on the next endpoint,
//! up to a bounded total budget, after which the aggregate failure is
//! surfaced with the last underlying error attached. The loop always
//! terminates; there is no path that spins on a dead endpoint set.

use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::ChainId;
use alloy_provider::RootProvider;
use tracing::{debug, info, warn};

use crate::config::ScannerConfig;
use crate::errors::PoolError;
use crate::transport::MinIntervalLayer;

/// Provider type held by the pool. `RootProvider` is internally
/// reference-counted, so cloning one per query is cheap.
pub type PooledProvider = RootProvider;

/// A rotating pool of read-only RPC endpoints for one chain.
///
/// The rotation cursor is atomic, so concurrent allowance reads may share
/// one pool without serialization; each failure pushes every caller past
/// the broken endpoint.
///
/// # Examples
///
/// ```rust,ignore
/// use allowscan::{RpcPool, ScannerConfig};
///
/// let pool = RpcPool::for_chain(&ScannerConfig::default(), 1)?;
/// let head = pool
///     .with_retry("eth_blockNumber", |provider| async move {
///         provider.get_block_number().await
///     })
///     .await?;
/// ```
#[derive(Debug)]
pub struct RpcPool {
    chain_id: ChainId,
    providers: Vec<PooledProvider>,
    cursor: AtomicUsize,
    retries_per_endpoint: u32,
}

impl RpcPool {
    /// Build the pool for a chain from configuration.
    ///
    /// # Errors
    ///
    /// Fails fast with [`PoolError::UnsupportedChain`] when the chain has no
    /// endpoint list, before any network traffic. Invalid endpoint URLs are
    /// also rejected here.
    pub fn for_chain(config: &ScannerConfig, chain_id: ChainId) -> Result<Self, PoolError> {
        let urls = config
            .endpoints_for(chain_id)
            .ok_or(PoolError::UnsupportedChain { chain_id })?;

        let providers = urls
            .iter()
            .map(|url| build_provider(url, config.endpoint_min_interval))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            chain_id = chain_id,
            endpoints = providers.len(),
            "Initialized RPC pool"
        );

        Ok(Self {
            chain_id,
            providers,
            cursor: AtomicUsize::new(0),
            retries_per_endpoint: config.pool_retries_per_endpoint.max(1),
        })
    }

    /// The chain this pool serves.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Number of endpoints in rotation.
    pub fn endpoint_count(&self) -> usize {
        self.providers.len()
    }

    /// Run a query with endpoint rotation and a bounded attempt budget.
    ///
    /// The closure receives a provider clone for the current endpoint. On
    /// any error the cursor advances (wrapping) and the query is retried on
    /// the next endpoint; the budget is `retries_per_endpoint × endpoints`.
    pub async fn with_retry<T, E, F, Fut>(&self, operation: &str, query: F) -> Result<T, PoolError>
    where
        F: Fn(PooledProvider) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let budget = self.retries_per_endpoint * self.providers.len() as u32;
        retry_round_robin(self.providers.len(), budget, &self.cursor, operation, |index| {
            query(self.providers[index].clone())
        })
        .await
    }
}

/// Round-robin retry loop over an indexed endpoint set.
///
/// Kept free of provider types so failover behavior is testable without
/// sockets. The cursor is shared and persists across calls, so consecutive
/// queries resume from the endpoint that last worked.
pub(crate) async fn retry_round_robin<T, E, F, Fut>(
    endpoints: usize,
    budget: u32,
    cursor: &AtomicUsize,
    operation: &str,
    attempt_fn: F,
) -> Result<T, PoolError>
where
    F: Fn(usize) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let budget = budget.max(1);
    let mut last_error: Option<Box<dyn std::error::Error + Send + Sync>> = None;

    for attempt in 1..=budget {
        let index = cursor.load(Ordering::Relaxed) % endpoints.max(1);

        match attempt_fn(index).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation,
                        attempt = attempt,
                        endpoint = index,
                        "Query succeeded after endpoint rotation"
                    );
                }
                return Ok(value);
            }
            Err(error) => {
                let error = error.into();
                warn!(
                    operation = operation,
                    attempt = attempt,
                    budget = budget,
                    endpoint = index,
                    error = %error,
                    "Endpoint failed, rotating to next"
                );
                cursor.fetch_add(1, Ordering::Relaxed);
                last_error = Some(error);
            }
        }
    }

    Err(PoolError::all_endpoints_failed(
        operation,
        budget,
        endpoints,
        last_error.unwrap_or_else(|| "no endpoints available".into()),
    ))
}

fn build_provider(
    url: &str,
    min_interval: Option<std::time::Duration>,
) -> Result<PooledProvider, PoolError> {
    let parsed: url::Url = url.parse().map_err(|_| PoolError::InvalidEndpoint {
        url: url.to_string(),
    })?;

    let client = match min_interval {
        Some(interval) => alloy_rpc_client::ClientBuilder::default()
            .layer(MinIntervalLayer::new(interval))
            .http(parsed),
        None => alloy_rpc_client::ClientBuilder::default().http(parsed),
    };

    Ok(RootProvider::new(client))
}
