// SPDX-License-Identifier: Apache-2.0

//! Wallet-provider error classification and revoke errors.
//!
//! Browser wallet providers report failures as loosely-typed numeric codes
//! (EIP-1193). They are mapped into the closed [`WalletErrorKind`]
//! enumeration at this boundary so no other module ever inspects raw codes.

/// Closed classification of wallet-provider failures.
///
/// Mapped from EIP-1193 / EIP-1474 numeric codes via
/// [`WalletErrorKind::from_code`]. Anything unrecognized collapses to
/// [`WalletErrorKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletErrorKind {
    /// The user declined the request in the wallet UI (code 4001).
    UserRejected,
    /// The wallet does not know the requested chain (code 4902).
    UnsupportedChain,
    /// A matching request is already pending in the wallet (code -32002).
    AlreadyPending,
    /// The requested method/account is not authorized (code 4100).
    Unauthorized,
    /// The provider is disconnected from all chains (code 4900).
    Disconnected,
    /// The provider is disconnected from the requested chain (code 4901).
    ChainDisconnected,
    /// Any other failure.
    Unknown,
}

impl WalletErrorKind {
    /// Classify a provider error code.
    pub fn from_code(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            4902 => Self::UnsupportedChain,
            -32002 => Self::AlreadyPending,
            4100 => Self::Unauthorized,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            _ => Self::Unknown,
        }
    }

    /// True for failures that are an expected user action rather than a bug.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}

impl std::fmt::Display for WalletErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::UserRejected => "request rejected by the user",
            Self::UnsupportedChain => "chain not supported by the wallet",
            Self::AlreadyPending => "a matching request is already pending",
            Self::Unauthorized => "not authorized by the wallet",
            Self::Disconnected => "wallet provider disconnected",
            Self::ChainDisconnected => "wallet disconnected from this chain",
            Self::Unknown => "unknown wallet error",
        };
        f.write_str(text)
    }
}

/// Errors from submitting an `approve(spender, 0)` revoke transaction.
///
/// Rejection by the user is an expected outcome and carries its own
/// variant; everything else is surfaced generically for the caller to
/// offer a manual retry. The engine never retries revokes on its own.
#[derive(Debug, thiserror::Error)]
pub enum RevokeError {
    /// The user declined the transaction in their wallet.
    #[error("revoke rejected by the user")]
    Rejected,

    /// Submission or confirmation failed for any other reason.
    #[error("revoke failed: {details}")]
    Submission {
        /// Underlying failure text
        details: String,
    },
}

impl RevokeError {
    /// Create a `Submission` error with details.
    pub fn submission(details: impl std::fmt::Display) -> Self {
        RevokeError::Submission {
            details: details.to_string(),
        }
    }

    /// True when the failure was the user declining, which callers should
    /// report calmly instead of as an application fault.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, RevokeError::Rejected)
    }
}
