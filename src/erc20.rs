// SPDX-License-Identifier: Apache-2.0

//! ERC-20 contract surface and Approval log handling
//!
//! The scanner needs four things from a token contract: `allowance`,
//! `symbol`, `decimals`, and `approve` (for revokes), plus the `Approval`
//! event for historical discovery. [`ApprovalFilterBuilder`] hides the
//! topic encoding: the owner address is left-padded to 32 bytes in topic1,
//! and the spender comes back padded in topic2, which
//! [`decode_approval_log`] trims back to 20 bytes before it can ever be
//! used as a set key.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_rpc_types::{Filter, Log};
use alloy_sol_types::sol;

use crate::types::ApprovalEvent;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Erc20 {
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// Keccak-256 hash of `Approval(address,address,uint256)`, i.e. topic0 of
/// every ERC-20 approval log.
pub fn approval_topic() -> B256 {
    keccak256(b"Approval(address,address,uint256)")
}

/// Recover the 20-byte address packed into a 32-byte log topic.
pub fn address_from_topic(topic: B256) -> Address {
    Address::from_word(topic)
}

/// Builder for ERC-20 `Approval` event filters
///
/// # Examples
///
/// ```rust
/// use allowscan::ApprovalFilterBuilder;
/// use alloy_primitives::Address;
///
/// let filter = ApprovalFilterBuilder::new()
///     .with_owner(Address::ZERO)
///     .in_block_range(1_000_000, 1_005_000)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApprovalFilterBuilder {
    owner: Option<Address>,
    from_block: Option<u64>,
    to_block: Option<u64>,
}

impl ApprovalFilterBuilder {
    /// Create a new Approval filter builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for approvals granted by a specific owner (topic1).
    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Restrict the filter to an inclusive block interval.
    pub fn in_block_range(mut self, from_block: u64, to_block: u64) -> Self {
        self.from_block = Some(from_block);
        self.to_block = Some(to_block);
        self
    }

    /// Build the final Alloy filter.
    pub fn build(self) -> Filter {
        let mut filter = Filter::new().event_signature(approval_topic());

        if let Some(owner) = self.owner {
            // Addresses are left-padded to a full word in indexed topics
            filter = filter.topic1(owner.into_word());
        }
        if let Some(from) = self.from_block {
            filter = filter.from_block(from);
        }
        if let Some(to) = self.to_block {
            filter = filter.to_block(to);
        }

        filter
    }
}

/// Decode one raw log into an [`ApprovalEvent`].
///
/// Returns `None` for logs that do not carry a well-formed Approval event
/// (wrong topic0, missing indexed topics, absent block/tx metadata).
/// Callers treat `None` as a skippable anomaly, not an error.
pub fn decode_approval_log(log: &Log) -> Option<ApprovalEvent> {
    let topics = log.inner.data.topics();
    if topics.len() < 3 || topics[0] != approval_topic() {
        return None;
    }

    let data = log.inner.data.data.as_ref();
    let raw_amount = if data.len() >= 32 {
        U256::from_be_slice(&data[..32])
    } else {
        U256::ZERO
    };

    Some(ApprovalEvent {
        token: log.inner.address,
        spender: address_from_topic(topics[2]),
        tx_hash: log.transaction_hash?,
        block_number: log.block_number?,
        raw_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256, Bytes, LogData};

    fn approval_log(token: Address, owner: Address, spender: Address, amount: U256) -> Log {
        let topics = vec![
            approval_topic(),
            owner.into_word(),
            spender.into_word(),
        ];
        let data = Bytes::from(amount.to_be_bytes::<32>().to_vec());
        Log {
            inner: alloy_primitives::Log {
                address: token,
                data: LogData::new_unchecked(topics, data),
            },
            block_number: Some(123),
            transaction_hash: Some(b256!(
                "00000000000000000000000000000000000000000000000000000000000000aa"
            )),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_round_trip() {
        let token = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
        let owner = address!("1111111111111111111111111111111111111111");
        let spender = address!("2222222222222222222222222222222222222222");
        let amount = U256::from(1_000u64);

        let event = decode_approval_log(&approval_log(token, owner, spender, amount)).unwrap();

        assert_eq!(event.token, token);
        assert_eq!(event.spender, spender);
        assert_eq!(event.block_number, 123);
        assert_eq!(event.raw_amount, amount);
    }

    #[test]
    fn test_decode_unpads_spender_topic() {
        let spender = address!("2222222222222222222222222222222222222222");
        let word = spender.into_word();
        // The topic carries 12 bytes of zero padding before the address
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(address_from_topic(word), spender);
    }

    #[test]
    fn test_decode_rejects_foreign_event() {
        let mut log = approval_log(
            Address::ZERO,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
        );
        let mut topics = log.inner.data.topics().to_vec();
        topics[0] = keccak256(b"Transfer(address,address,uint256)");
        log.inner.data = LogData::new_unchecked(topics, log.inner.data.data.clone());

        assert!(decode_approval_log(&log).is_none());
    }

    #[test]
    fn test_decode_rejects_pending_log() {
        let mut log = approval_log(
            Address::ZERO,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
        );
        log.block_number = None;
        assert!(decode_approval_log(&log).is_none());
    }

    #[test]
    fn test_filter_carries_owner_topic() {
        let owner = address!("1111111111111111111111111111111111111111");
        let filter = ApprovalFilterBuilder::new()
            .with_owner(owner)
            .in_block_range(10, 20)
            .build();

        assert_eq!(filter.get_from_block(), Some(10));
        assert_eq!(filter.get_to_block(), Some(20));
        assert!(!filter.topics[1].is_empty());
    }

    #[test]
    fn test_empty_amount_data_defaults_to_zero() {
        let mut log = approval_log(
            Address::ZERO,
            Address::ZERO,
            Address::ZERO,
            U256::from(5u64),
        );
        log.inner.data = LogData::new_unchecked(
            log.inner.data.topics().to_vec(),
            Bytes::new(),
        );
        let event = decode_approval_log(&log).unwrap();
        assert_eq!(event.raw_amount, U256::ZERO);
    }
}
