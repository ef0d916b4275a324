// SPDX-License-Identifier: Apache-2.0

//! Error types for the allowscan library.
//!
//! Follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`PoolError`],
//!   [`ExplorerError`], [`ScanError`], [`RevokeError`])
//! - **Unified error type** ([`AllowscanError`]) for callers that do not
//!   need to distinguish error sources
//!
//! The taxonomy the scanner operates under:
//!
//! - transient network / rate-limit errors are retried with bounded backoff
//!   inside the fetchers and never surface individually;
//! - pool exhaustion (every endpoint failed within budget) is fatal to the
//!   scan;
//! - missing configuration (an unsupported chain id) is fatal and detected
//!   before any network call;
//! - per-item resolution failures (one token or spender) are logged and
//!   excluded from output without aborting the batch;
//! - a user-rejected revoke transaction is expected and reported distinctly.

mod explorer;
mod pool;
mod scan;
mod wallet;

pub use explorer::ExplorerError;
pub use pool::PoolError;
pub use scan::{ChainDataError, ScanError};
pub use wallet::{RevokeError, WalletErrorKind};

/// Unified error type for all allowscan operations.
///
/// Module-specific errors convert into this via `From`, so `?` propagates
/// naturally in application code that mixes scanning and revoking.
#[derive(Debug, thiserror::Error)]
pub enum AllowscanError {
    /// Error from the RPC endpoint pool.
    #[error("RPC pool error: {0}")]
    Pool(#[from] PoolError),

    /// Error from the block-explorer API client.
    #[error("Explorer API error: {0}")]
    Explorer(#[from] ExplorerError),

    /// Error from a wallet allowance scan.
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Error from a revoke submission.
    #[error("Revoke error: {0}")]
    Revoke(#[from] RevokeError),
}
