// SPDX-License-Identifier: Apache-2.0

//! Production [`ChainData`] implementation over the rotating RPC pool.

use alloy_primitives::{Address, ChainId, U256};
use alloy_provider::Provider;
use async_trait::async_trait;
use tracing::warn;

use super::{ChainData, RpcPool};
use crate::erc20::{decode_approval_log, ApprovalFilterBuilder, Erc20};
use crate::errors::ChainDataError;
use crate::types::ApprovalEvent;

/// [`ChainData`] backed by [`RpcPool`].
///
/// Every read goes through the pool's rotation-and-retry loop, so a single
/// flaky endpoint never fails a token or a pair on its own.
#[derive(Debug)]
pub struct PooledChainData {
    pool: RpcPool,
}

impl PooledChainData {
    /// Wrap a pool.
    pub fn new(pool: RpcPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &RpcPool {
        &self.pool
    }
}

#[async_trait]
impl ChainData for PooledChainData {
    fn chain_id(&self) -> ChainId {
        self.pool.chain_id()
    }

    async fn block_number(&self) -> Result<u64, ChainDataError> {
        let block = self
            .pool
            .with_retry("eth_blockNumber", |provider| async move {
                provider.get_block_number().await
            })
            .await?;
        Ok(block)
    }

    async fn approval_logs(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ChainDataError> {
        let filter = ApprovalFilterBuilder::new()
            .with_owner(owner)
            .in_block_range(from_block, to_block)
            .build();

        let logs = self
            .pool
            .with_retry("eth_getLogs", |provider| {
                let filter = filter.clone();
                async move { provider.get_logs(&filter).await }
            })
            .await?;

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            match decode_approval_log(log) {
                Some(event) => events.push(event),
                None => warn!(
                    token = %log.inner.address,
                    "Skipping undecodable approval log"
                ),
            }
        }
        Ok(events)
    }

    async fn token_symbol(&self, token: Address) -> Result<String, ChainDataError> {
        let symbol = self
            .pool
            .with_retry("erc20.symbol", |provider| async move {
                let contract = Erc20::new(token, provider);
                contract.symbol().call().await
            })
            .await?;
        Ok(symbol)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ChainDataError> {
        let decimals = self
            .pool
            .with_retry("erc20.decimals", |provider| async move {
                let contract = Erc20::new(token, provider);
                contract.decimals().call().await
            })
            .await?;
        Ok(decimals)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainDataError> {
        let allowance = self
            .pool
            .with_retry("erc20.allowance", |provider| async move {
                let contract = Erc20::new(token, provider);
                contract.allowance(owner, spender).call().await
            })
            .await?;
        Ok(allowance)
    }
}
