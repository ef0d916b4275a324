// SPDX-License-Identifier: Apache-2.0

//! RPC-backed approval source with block-range chunking.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{info, warn};

use super::ApprovalEventSource;
use crate::errors::ScanError;
use crate::provider::ChainData;
use crate::types::{ApprovalEvent, ChunkSize};

/// Fetches `Approval` logs directly from a node, splitting wide scan
/// windows into bounded `eth_getLogs` queries.
///
/// A chunk whose query fails (after the pool's own rotation budget) is
/// logged and skipped rather than aborting the scan.
pub struct RpcLogSource {
    chain: Arc<dyn ChainData>,
    chunk_size: ChunkSize,
}

impl RpcLogSource {
    /// Create a source reading through the given chain capability.
    pub fn new(chain: Arc<dyn ChainData>, chunk_size: ChunkSize) -> Self {
        Self { chain, chunk_size }
    }
}

#[async_trait]
impl ApprovalEventSource for RpcLogSource {
    async fn fetch_approvals(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ScanError> {
        info!(
            %owner,
            from_block,
            to_block,
            chunks = self.chunk_size.chunks_needed(from_block, to_block),
            "Scanning approval logs over RPC"
        );

        let mut events = Vec::new();
        for (chunk_start, chunk_end) in self.chunk_size.chunks(from_block, to_block) {
            match self
                .chain
                .approval_logs(owner, chunk_start, chunk_end)
                .await
            {
                Ok(chunk_events) => events.extend(chunk_events),
                Err(error) => {
                    warn!(
                        chunk_start,
                        chunk_end,
                        error = %error,
                        "Skipping failed log chunk"
                    );
                }
            }
        }

        info!(total_events = events.len(), "Finished RPC approval scan");
        Ok(events)
    }
}
