// SPDX-License-Identifier: Apache-2.0

//! Discovery and revocation support for outstanding ERC-20 allowances.
//!
//! Given a wallet address, the engine reconstructs the current set of
//! non-zero token → spender allowances from a noisy, paginated, rate-limited
//! view of on-chain history:
//!
//! 1. a pluggable [event source](events::ApprovalEventSource) pulls raw
//!    `Approval` evidence (direct RPC log queries or a block-explorer API),
//! 2. the [scanner](AllowanceScanner) deduplicates it into (token, spender)
//!    pairs and re-reads every allowance *live*, because historical events
//!    prove a grant happened, not that it is still active,
//! 3. zero allowances are dropped and the survivors formatted for display.
//!
//! All chain access goes through capability traits
//! ([`provider::ChainData`], [`explorer::ExplorerApi`]), so the entire
//! pipeline runs against mocks in tests and against the rotating
//! [`RpcPool`] / [`EtherscanClient`] in production.

pub mod amount;
pub mod cache;
pub mod config;
pub mod erc20;
pub mod errors;
pub mod events;
pub mod explorer;
pub mod metadata;
pub mod provider;
pub mod revoke;
pub mod scanner;
pub mod transport;
pub mod types;

pub use amount::{base_unit_value, format_allowance, is_unlimited, shorten_number};
pub use cache::{CacheStorage, ContractSourceCache, FileStorage, MemoryStorage};
pub use config::{
    ChainEndpoints, EventSourceStrategy, ScannerConfig, ScannerConfigBuilder,
};
pub use erc20::{approval_topic, ApprovalFilterBuilder};
pub use errors::{
    AllowscanError, ChainDataError, ExplorerError, PoolError, RevokeError, ScanError,
    WalletErrorKind,
};
pub use events::{ApprovalEventSource, ExplorerLogSource, ExplorerTxSource, RpcLogSource};
pub use explorer::{ContractSource, EtherscanClient, ExplorerApi};
pub use metadata::{SpenderDirectory, TokenMetadataResolver};
pub use provider::{ChainData, PooledChainData, PooledProvider, RpcPool};
pub use revoke::{prune_revoked, revoke_allowance};
pub use scanner::AllowanceScanner;
pub use types::{
    AllowanceInfo, ApprovalEvent, BlockChunks, ChunkSize, ScanOptions, TokenApprovalSet,
    TokenDecimals, TokenInfo,
};
