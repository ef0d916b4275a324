// SPDX-License-Identifier: Apache-2.0

//! Approval events, the per-token spender set, and the scan output record.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::token::TokenInfo;

/// One historical `Approval` log (or `approve()` transaction)
///
/// Raw evidence that the owner once granted an allowance; not proof of
/// current state. Multiple events may reference the same (token, spender)
/// pair over time; only the relationship's existence matters, because the
/// authoritative allowance is always re-read live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEvent {
    /// Token contract that emitted the event
    pub token: Address,
    /// Contract authorized to spend
    pub spender: Address,
    /// Transaction that carried the approval
    pub tx_hash: B256,
    /// Block the approval landed in
    pub block_number: u64,
    /// Approved amount as recorded historically (informational only)
    pub raw_amount: U256,
}

/// Deduplicated token → spender mapping built from raw approval events
///
/// Spender uniqueness is value-based on the canonical 20-byte [`Address`];
/// padded 32-byte log topics must be converted to an `Address` before
/// insertion, which the log decoders do at the decode boundary. Per spender
/// the last-seen transaction hash is kept, purely as an explorer link and
/// UI key.
#[derive(Debug, Clone, Default)]
pub struct TokenApprovalSet {
    entries: HashMap<Address, HashMap<Address, B256>>,
}

impl TokenApprovalSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from a stream of raw events
    pub fn from_events(events: impl IntoIterator<Item = ApprovalEvent>) -> Self {
        let mut set = Self::new();
        for event in events {
            set.insert(&event);
        }
        set
    }

    /// Record one raw event, deduplicating by (token, spender)
    pub fn insert(&mut self, event: &ApprovalEvent) {
        self.entries
            .entry(event.token)
            .or_default()
            .insert(event.spender, event.tx_hash);
    }

    /// Number of distinct tokens seen
    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of distinct (token, spender) pairs
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    /// True when no approvals were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate tokens with their deduplicated spender → tx hash sets
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &HashMap<Address, B256>)> {
        self.entries.iter()
    }
}

/// Options controlling a single wallet scan
///
/// When `from_block` is absent, `block_range` is interpreted as "the most
/// recent N blocks before the current one"; when both are absent the
/// configured default scan window applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// First block to scan (inclusive)
    pub from_block: Option<u64>,
    /// Last block to scan (inclusive); defaults to the current block
    pub to_block: Option<u64>,
    /// Scan the most recent N blocks (ignored when `from_block` is set)
    pub block_range: Option<u64>,
}

impl ScanOptions {
    /// Scan the most recent `blocks` blocks
    pub fn last_blocks(blocks: u64) -> Self {
        Self {
            block_range: Some(blocks),
            ..Self::default()
        }
    }

    /// Scan an explicit inclusive block interval
    pub fn between(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block: Some(from_block),
            to_block: Some(to_block),
            block_range: None,
        }
    }
}

/// One actionable allowance, as produced by a scan
///
/// Created only when the live on-chain allowance is non-zero; removed from
/// the in-memory result set as soon as a revoke for its (token, spender)
/// pair confirms. Never persisted, recomputed on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceInfo {
    /// The token the allowance is drawn on
    pub token: TokenInfo,
    /// The contract authorized to spend
    pub spender: Address,
    /// Live allowance in base units, as a decimal string
    pub allowance: String,
    /// Human-readable rendering (fixed, scientific, or "Unlimited <symbol>")
    pub formatted_allowance: String,
    /// Transaction hash of the historical approval (UI key / explorer link)
    pub tx_hash: B256,
    /// Base URL of the chain's block explorer, when known
    pub explorer_link: Option<String>,
    /// Verified contract name of the spender, when resolvable
    pub spender_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    fn event(token: Address, spender: Address, tx: B256) -> ApprovalEvent {
        ApprovalEvent {
            token,
            spender,
            tx_hash: tx,
            block_number: 1,
            raw_amount: U256::from(100u64),
        }
    }

    #[test]
    fn test_dedupes_spenders_by_value() {
        let token = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let spender = address!("1111111111111111111111111111111111111111");
        let tx_a = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        let tx_b = b256!("00000000000000000000000000000000000000000000000000000000000000bb");

        let set = TokenApprovalSet::from_events([
            event(token, spender, tx_a),
            event(token, spender, tx_b),
        ]);

        assert_eq!(set.token_count(), 1);
        assert_eq!(set.pair_count(), 1);

        // Last-seen tx hash wins
        let (_, spenders) = set.iter().next().unwrap();
        assert_eq!(spenders[&spender], tx_b);
    }

    #[test]
    fn test_groups_by_token() {
        let token_a = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let token_b = address!("6b175474e89094c44da98b954eedeac495271d0f");
        let spender = address!("1111111111111111111111111111111111111111");
        let tx = B256::ZERO;

        let set = TokenApprovalSet::from_events([
            event(token_a, spender, tx),
            event(token_b, spender, tx),
        ]);

        assert_eq!(set.token_count(), 2);
        assert_eq!(set.pair_count(), 2);
    }

    #[test]
    fn test_scan_options_constructors() {
        let recent = ScanOptions::last_blocks(60_000);
        assert_eq!(recent.block_range, Some(60_000));
        assert_eq!(recent.from_block, None);

        let explicit = ScanOptions::between(100, 200);
        assert_eq!(explicit.from_block, Some(100));
        assert_eq!(explicit.to_block, Some(200));
    }
}
