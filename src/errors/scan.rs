// SPDX-License-Identifier: Apache-2.0

//! Errors from chain-data reads and whole-wallet scans.

use super::{ExplorerError, PoolError};

/// Errors from the chain-data capability (live reads against a node).
///
/// Implementations back this with the RPC pool in production and with
/// scripted failures in tests.
#[derive(Debug, thiserror::Error)]
pub enum ChainDataError {
    /// The underlying endpoint pool was exhausted.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// A single chain read failed.
    #[error("{operation} failed: {details}")]
    Call {
        /// The read that failed (e.g. "allowance", "getBlockNumber")
        operation: String,
        /// Underlying failure text
        details: String,
    },
}

impl ChainDataError {
    /// Create a `Call` error with context.
    pub fn call(operation: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ChainDataError::Call {
            operation: operation.into(),
            details: details.to_string(),
        }
    }
}

/// Errors that fail an entire wallet scan.
///
/// Per-item failures (one token's metadata, one pair's allowance read, one
/// skipped page or chunk) do not produce this type; they are logged and the
/// scan continues on partial data.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Required configuration is missing, detected before any network call.
    #[error("missing configuration: {field}")]
    MissingConfiguration {
        /// Name of the missing configuration field
        field: String,
    },

    /// A required live chain read failed beyond recovery.
    #[error("chain read failed: {0}")]
    Chain(#[from] ChainDataError),

    /// The explorer API failed in a way that prevents any progress.
    #[error("explorer error: {0}")]
    Explorer(#[from] ExplorerError),

    /// The scan exceeded the configured wall-clock bound.
    #[error("scan timed out after {seconds}s")]
    Timeout {
        /// The configured bound, in seconds
        seconds: u64,
    },

    /// A newer scan was started while this one was in flight; its results
    /// are stale and have been discarded.
    #[error("scan superseded by a newer scan")]
    Superseded,
}

impl ScanError {
    /// Create a `MissingConfiguration` error for a specific field.
    pub fn missing_configuration(field: impl Into<String>) -> Self {
        ScanError::MissingConfiguration {
            field: field.into(),
        }
    }
}
