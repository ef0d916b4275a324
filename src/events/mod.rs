// SPDX-License-Identifier: Apache-2.0

//! Historical approval event sources
//!
//! One trait, three interchangeable backends (selected by
//! [`EventSourceStrategy`](crate::EventSourceStrategy)): direct RPC log
//! queries, explorer log pages, and explorer transaction pages. All of
//! them reduce history to the same [`ApprovalEvent`] stream, so the
//! aggregator is oblivious to where the data came from.

mod explorer;
mod logs;

pub use explorer::{ExplorerLogSource, ExplorerTxSource};
pub use logs::RpcLogSource;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::errors::ScanError;
use crate::types::ApprovalEvent;

/// A finite, fully-materialized source of historical approval events.
///
/// Implementations tolerate partial data-source failure: a chunk or page
/// that cannot be fetched within its retry bound is skipped with a warning
/// and the accumulated prefix is returned. Downstream aggregation only
/// needs *a* signal that a (token, spender) relationship exists, so a
/// missing historical event degrades coverage, not correctness.
#[async_trait]
pub trait ApprovalEventSource: Send + Sync {
    /// Fetch every discoverable approval granted by `owner` within the
    /// inclusive block range.
    async fn fetch_approvals(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ScanError>;
}
