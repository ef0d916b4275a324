// SPDX-License-Identifier: Apache-2.0

//! Errors from the rotating RPC endpoint pool.

use alloy_primitives::ChainId;

/// Errors that can occur when building or querying the RPC pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// No RPC endpoints are configured for the requested chain.
    ///
    /// Detected before any network call; scans on an unconfigured chain
    /// fail fast rather than guessing at a default endpoint.
    #[error("no RPC endpoints configured for chain {chain_id}")]
    UnsupportedChain {
        /// The chain id that has no endpoint list
        chain_id: ChainId,
    },

    /// An endpoint URL in the configuration could not be parsed.
    #[error("invalid RPC endpoint URL: {url}")]
    InvalidEndpoint {
        /// The offending URL string
        url: String,
    },

    /// Every endpoint failed within the attempt budget.
    ///
    /// The retry loop rotates through all endpoints up to the configured
    /// bound and then surfaces this aggregate failure with the last
    /// underlying error attached; it never spins indefinitely.
    #[error("{operation} failed after {attempts} attempts across {endpoints} endpoints")]
    AllEndpointsFailed {
        /// Description of the query that was being retried
        operation: String,
        /// Total attempts made before giving up
        attempts: u32,
        /// Number of distinct endpoints in rotation
        endpoints: usize,
        /// The error from the final attempt
        #[source]
        last_error: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PoolError {
    /// Helper to build an `AllEndpointsFailed` from the final attempt's error.
    pub fn all_endpoints_failed(
        operation: impl Into<String>,
        attempts: u32,
        endpoints: usize,
        last_error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        PoolError::AllEndpointsFailed {
            operation: operation.into(),
            attempts,
            endpoints,
            last_error: last_error.into(),
        }
    }
}
