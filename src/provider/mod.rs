// SPDX-License-Identifier: Apache-2.0

//! Chain-data capability and its pooled production implementation.
//!
//! The scanner never talks to a node directly; it consumes the [`ChainData`]
//! trait, which covers exactly the reads a scan needs. Production code backs
//! it with [`PooledChainData`] over the rotating [`RpcPool`]; tests back it
//! with scripted mocks.

mod live;
mod pool;

pub use live::PooledChainData;
pub use pool::{PooledProvider, RpcPool};

use alloy_primitives::{Address, ChainId, U256};
use async_trait::async_trait;

use crate::errors::ChainDataError;
use crate::types::ApprovalEvent;

/// Read-only chain access required by an allowance scan.
///
/// `approval_logs` answers a single bounded range; chunking wide scan
/// windows into such ranges is the event fetcher's job, not the
/// capability's. Allowance reads are always live and never cached:
/// historical events prove a grant once existed, not that it still does.
#[async_trait]
pub trait ChainData: Send + Sync {
    /// The chain this capability is bound to.
    fn chain_id(&self) -> ChainId;

    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ChainDataError>;

    /// All `Approval` logs granted by `owner` within one inclusive block
    /// range. The range is expected to already respect node query limits.
    async fn approval_logs(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ChainDataError>;

    /// `symbol()` of a token contract.
    async fn token_symbol(&self, token: Address) -> Result<String, ChainDataError>;

    /// `decimals()` of a token contract.
    async fn token_decimals(&self, token: Address) -> Result<u8, ChainDataError>;

    /// Live `allowance(owner, spender)` on a token contract.
    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ChainDataError>;
}
