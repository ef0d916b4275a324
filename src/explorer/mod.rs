// SPDX-License-Identifier: Apache-2.0

//! Block-explorer API capability
//!
//! Explorer-backed event sources and spender-name resolution consume the
//! [`ExplorerApi`] trait. Production code backs it with
//! [`EtherscanClient`]; tests back it with scripted pages.

mod etherscan;

pub use etherscan::EtherscanClient;

use alloy_primitives::{Address, Bytes, ChainId, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ExplorerError;
use crate::types::ApprovalEvent;

/// One log entry as returned by the explorer's `logs.getLogs` endpoint.
///
/// Numeric fields arrive as hex quantity strings and are parsed lazily in
/// [`ExplorerLogEntry::into_approval_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerLogEntry {
    /// Emitting contract (the token)
    pub address: Address,
    /// Indexed topics; topic2 carries the spender, left-padded to 32 bytes
    pub topics: Vec<B256>,
    /// Non-indexed payload (the approved amount)
    #[serde(default)]
    pub data: Bytes,
    /// Block number as a hex quantity string
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    /// Transaction hash
    #[serde(rename = "transactionHash")]
    pub transaction_hash: B256,
}

impl ExplorerLogEntry {
    /// Decode into an [`ApprovalEvent`], trimming the padded spender topic
    /// down to its 20-byte address. Returns `None` for malformed entries.
    pub fn into_approval_event(self) -> Option<ApprovalEvent> {
        if self.topics.len() < 3 {
            return None;
        }
        let raw_amount = if self.data.len() >= 32 {
            U256::from_be_slice(&self.data[..32])
        } else {
            U256::ZERO
        };
        Some(ApprovalEvent {
            token: self.address,
            spender: Address::from_word(self.topics[2]),
            tx_hash: self.transaction_hash,
            block_number: parse_quantity(&self.block_number)?,
            raw_amount,
        })
    }
}

/// One transaction as returned by the explorer's `account.txlist` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerTxEntry {
    /// Transaction hash
    pub hash: B256,
    /// Called contract; empty string for contract creations
    #[serde(default)]
    pub to: String,
    /// Calldata as a hex string
    #[serde(default)]
    pub input: String,
    /// Decoded function signature, e.g. `approve(address spender, uint256 amount)`
    #[serde(rename = "functionName", default)]
    pub function_name: String,
    /// Block number as a decimal string
    #[serde(rename = "blockNumber", default)]
    pub block_number: String,
}

impl ExplorerTxEntry {
    /// True when this transaction is an ERC-20 `approve(...)` call.
    pub fn is_approval(&self) -> bool {
        self.function_name.starts_with("approve(")
    }

    /// Decode into an [`ApprovalEvent`]: the called contract is the token,
    /// the spender sits in calldata word one (hex chars 34..74 after the
    /// selector padding), the amount in word two. Returns `None` for
    /// non-approvals and malformed calldata.
    pub fn into_approval_event(self) -> Option<ApprovalEvent> {
        if !self.is_approval() || self.input.len() < 74 {
            return None;
        }
        let token: Address = self.to.parse().ok()?;
        let spender: Address = format!("0x{}", &self.input[34..74]).parse().ok()?;
        let raw_amount = self
            .input
            .get(74..138)
            .and_then(|word| U256::from_str_radix(word, 16).ok())
            .unwrap_or(U256::ZERO);

        Some(ApprovalEvent {
            token,
            spender,
            tx_hash: self.hash,
            block_number: parse_quantity(&self.block_number)?,
            raw_amount,
        })
    }
}

/// Verification status of a spender contract, as cached between scans.
///
/// `contract_name: None` is a definitive "not verified" answer, cached the
/// same as a positive one so a miss is not re-fetched every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSource {
    /// Verified contract name, if any
    pub contract_name: Option<String>,
}

impl ContractSource {
    /// A verified contract with its name.
    pub fn verified(name: impl Into<String>) -> Self {
        Self {
            contract_name: Some(name.into()),
        }
    }

    /// A definitive "no verified source" answer.
    pub fn unverified() -> Self {
        Self {
            contract_name: None,
        }
    }
}

/// Paginated historical data from a block explorer.
///
/// Page numbering is 1-based, matching the upstream API. A page past the
/// end of the data yields an empty vec (terminal), never an error.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// One page of `Approval` logs granted by `owner` in the block range.
    async fn approval_logs(
        &self,
        chain_id: ChainId,
        owner: Address,
        from_block: u64,
        to_block: u64,
        page: u64,
        offset: u64,
    ) -> Result<Vec<ExplorerLogEntry>, ExplorerError>;

    /// One page of the account's transaction list in the block range.
    async fn account_transactions(
        &self,
        chain_id: ChainId,
        address: Address,
        from_block: u64,
        to_block: u64,
        page: u64,
        offset: u64,
    ) -> Result<Vec<ExplorerTxEntry>, ExplorerError>;

    /// Verified source metadata for a contract.
    async fn contract_source(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> Result<ContractSource, ExplorerError>;
}

/// Parse a block-number string that may be hex ("0x1a") or decimal ("26").
fn parse_quantity(value: &str) -> Option<u64> {
    if let Some(hex) = value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use crate::erc20::approval_topic;

    #[test]
    fn test_parse_quantity_forms() {
        assert_eq!(parse_quantity("0x10"), Some(16));
        assert_eq!(parse_quantity("26"), Some(26));
        assert_eq!(parse_quantity("bogus"), None);
    }

    #[test]
    fn test_log_entry_decodes_and_unpads() {
        let spender = address!("2222222222222222222222222222222222222222");
        let entry = ExplorerLogEntry {
            address: address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            topics: vec![
                approval_topic(),
                address!("1111111111111111111111111111111111111111").into_word(),
                spender.into_word(),
            ],
            data: Bytes::from(U256::from(7u64).to_be_bytes::<32>().to_vec()),
            block_number: "0x10d4f".to_string(),
            transaction_hash: b256!(
                "00000000000000000000000000000000000000000000000000000000000000aa"
            ),
        };

        let event = entry.into_approval_event().unwrap();
        assert_eq!(event.spender, spender);
        assert_eq!(event.block_number, 0x10d4f);
        assert_eq!(event.raw_amount, U256::from(7u64));
    }

    #[test]
    fn test_tx_entry_approval_detection() {
        let spender = "2222222222222222222222222222222222222222";
        let entry = ExplorerTxEntry {
            hash: B256::ZERO,
            to: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
            input: format!(
                "0x095ea7b3000000000000000000000000{spender}{}",
                "f".repeat(64)
            ),
            function_name: "approve(address spender, uint256 amount)".to_string(),
            block_number: "123".to_string(),
        };

        assert!(entry.is_approval());
        let event = entry.into_approval_event().unwrap();
        assert_eq!(
            event.spender,
            address!("2222222222222222222222222222222222222222")
        );
        assert_eq!(event.raw_amount, U256::MAX);
        assert_eq!(event.block_number, 123);
    }

    #[test]
    fn test_tx_entry_skips_non_approvals() {
        let entry = ExplorerTxEntry {
            hash: B256::ZERO,
            to: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".to_string(),
            input: "0x".to_string(),
            function_name: "transfer(address to, uint256 amount)".to_string(),
            block_number: "123".to_string(),
        };
        assert!(!entry.is_approval());
        assert!(entry.into_approval_event().is_none());
    }

    #[test]
    fn test_contract_source_constructors() {
        assert_eq!(
            ContractSource::verified("UniswapV2Router02").contract_name.as_deref(),
            Some("UniswapV2Router02")
        );
        assert!(ContractSource::unverified().contract_name.is_none());
    }
}
