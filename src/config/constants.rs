// SPDX-License-Identifier: Apache-2.0

//! Built-in defaults: chain endpoint tables, explorer URLs, and the knobs
//! governing chunking, pagination, and retries.

use std::time::Duration;

use alloy_primitives::ChainId;

use crate::types::ChunkSize;

/// Ethereum mainnet chain id
pub const ETHEREUM: ChainId = 1;
/// BNB Smart Chain chain id
pub const BSC: ChainId = 56;
/// Polygon PoS chain id
pub const POLYGON: ChainId = 137;
/// Arbitrum One chain id
pub const ARBITRUM: ChainId = 42161;
/// Zeniq Smart Chain chain id
pub const ZENIQ: ChainId = 383_414_847_825;

/// Default block span per `eth_getLogs` query (public node limits are
/// typically 5k-10k blocks).
pub const DEFAULT_LOG_CHUNK: ChunkSize = ChunkSize::DEFAULT;

/// Page size for the explorer `logs.getLogs` endpoint.
pub const EXPLORER_LOG_PAGE_SIZE: u64 = 1000;

/// Page size for the explorer `account.txlist` endpoint.
pub const EXPLORER_TX_PAGE_SIZE: u64 = 2000;

/// Per-page retry bound for explorer fetches.
pub const EXPLORER_PAGE_RETRIES: u32 = 2;

/// Base delay for linear backoff on rate-limited explorer pages; the
/// actual delay is `attempt * base`.
pub const EXPLORER_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Pause between successive explorer pages.
pub const EXPLORER_PAGE_DELAY: Duration = Duration::from_millis(200);

/// Attempts per endpoint before the RPC pool gives up; the total budget is
/// this times the endpoint count.
pub const POOL_RETRIES_PER_ENDPOINT: u32 = 2;

/// Default historical scan window when the caller sets neither a start
/// block nor a range. One million blocks covers roughly four months of
/// mainnet history; it is a completeness/cost trade-off and deliberately
/// configurable.
pub const DEFAULT_SCAN_WINDOW: u64 = 1_000_000;

/// Time-to-live for cached contract-source lookups.
pub const CONTRACT_SOURCE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Etherscan v2 multichain API base URL.
pub const ETHERSCAN_V2_API: &str = "https://api.etherscan.io/v2/api";

/// Built-in read-only RPC endpoints per chain.
///
/// These are public endpoints with uneven reliability, which is exactly why
/// the pool rotates across several of them per chain.
pub(crate) fn default_endpoints(chain_id: ChainId) -> Option<&'static [&'static str]> {
    match chain_id {
        ETHEREUM => Some(&[
            "https://eth.llamarpc.com",
            "https://rpc.ankr.com/eth",
            "https://ethereum-rpc.publicnode.com",
            "https://1rpc.io/eth",
            "https://rpc.mevblocker.io",
            "https://rpc.flashbots.net",
            "https://cloudflare-eth.com",
            "https://eth-mainnet.public.blastapi.io",
            "https://eth-pokt.nodies.app",
            "https://ethereum.blockpi.network/v1/rpc/public",
        ]),
        BSC => Some(&[
            "https://bsc-pokt.nodies.app",
            "https://bscrpc.com",
            "https://binance.llamarpc.com",
            "https://bsc-dataseed1.ninicoin.io",
            "https://bsc-dataseed2.defibit.io",
            "https://bsc-dataseed.bnbchain.org",
        ]),
        POLYGON => Some(&[
            "https://polygon.llamarpc.com",
            "https://polygon.drpc.org",
            "https://1rpc.io/matic",
            "https://polygon.meowrpc.com",
        ]),
        ARBITRUM => Some(&[
            "https://arbitrum.llamarpc.com",
            "https://arbitrum.drpc.org",
            "https://arbitrum.meowrpc.com",
            "https://arb-pokt.nodies.app",
        ]),
        ZENIQ => Some(&["https://api.zeniq.network"]),
        _ => None,
    }
}

/// Block explorer base URL per chain, used for outbound links on results.
pub(crate) fn default_explorer_url(chain_id: ChainId) -> Option<&'static str> {
    match chain_id {
        ETHEREUM => Some("https://etherscan.io"),
        BSC => Some("https://bscscan.com"),
        POLYGON => Some("https://polygonscan.com"),
        ARBITRUM => Some("https://arbiscan.io"),
        ZENIQ => Some("https://smart.zeniq.net"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chains_have_endpoints() {
        for chain in [ETHEREUM, BSC, POLYGON, ARBITRUM, ZENIQ] {
            let endpoints = default_endpoints(chain).unwrap();
            assert!(!endpoints.is_empty());
        }
    }

    #[test]
    fn test_unknown_chain_has_none() {
        assert!(default_endpoints(999_999).is_none());
        assert!(default_explorer_url(999_999).is_none());
    }

    #[test]
    fn test_explorer_urls_align_with_endpoints() {
        for chain in [ETHEREUM, BSC, POLYGON, ARBITRUM, ZENIQ] {
            assert!(default_explorer_url(chain).is_some());
        }
    }
}
