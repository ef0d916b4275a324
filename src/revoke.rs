// SPDX-License-Identifier: Apache-2.0

//! Revoking an allowance
//!
//! A revoke is a fresh `approve(spender, 0)` submitted through the
//! caller's signer-capable provider. The engine never retries a revoke on
//! its own: a user rejection is a deliberate choice, and anything else is
//! surfaced for the user to retry manually.

use alloy_primitives::{Address, B256, U256};
use alloy_provider::Provider;
use tracing::info;

use crate::erc20::Erc20;
use crate::errors::{RevokeError, WalletErrorKind};
use crate::types::AllowanceInfo;

/// Submit `approve(spender, 0)` for one allowance record and wait for it
/// to land on chain. Returns the revoke transaction's hash.
///
/// The provider must be able to sign and send transactions for the token
/// owner (e.g. carry a wallet filler); read-only pool providers will fail
/// here, by design.
///
/// # Errors
///
/// [`RevokeError::Rejected`] when the user declined in their wallet;
/// [`RevokeError::Submission`] for every other failure.
pub async fn revoke_allowance<P: Provider>(
    provider: P,
    record: &AllowanceInfo,
) -> Result<B256, RevokeError> {
    let token = Erc20::new(record.token.address, provider);

    let pending = token
        .approve(record.spender, U256::ZERO)
        .send()
        .await
        .map_err(classify_send_error)?;

    let tx_hash = pending.watch().await.map_err(RevokeError::submission)?;

    info!(
        token = %record.token.address,
        spender = %record.spender,
        %tx_hash,
        "Allowance revoked"
    );
    Ok(tx_hash)
}

/// Remove every record matching (token, spender) from an in-memory result
/// set, returning how many were removed.
///
/// Matching deliberately ignores `tx_hash`: the revoke itself produced a
/// new transaction, so the stored hash of the historical approval is stale
/// as an identifier.
pub fn prune_revoked(records: &mut Vec<AllowanceInfo>, token: Address, spender: Address) -> usize {
    let before = records.len();
    records.retain(|record| !(record.token.address == token && record.spender == spender));
    before - records.len()
}

fn classify_send_error(error: alloy_contract::Error) -> RevokeError {
    let code = match &error {
        alloy_contract::Error::TransportError(transport) => {
            transport.as_error_resp().map(|payload| payload.code)
        }
        _ => None,
    };
    if is_user_rejection(code, &error.to_string()) {
        RevokeError::Rejected
    } else {
        RevokeError::submission(error)
    }
}

/// Decide whether a failure is the user declining the transaction.
///
/// EIP-1193 wallets report code 4001; ethers-style wallets stringify it as
/// `ACTION_REJECTED`; MetaMask phrases it as a denied signature.
fn is_user_rejection(code: Option<i64>, text: &str) -> bool {
    if code.map(WalletErrorKind::from_code).is_some_and(|kind| kind.is_user_rejection()) {
        return true;
    }
    let lower = text.to_ascii_lowercase();
    text.contains("ACTION_REJECTED")
        || lower.contains("user rejected")
        || lower.contains("user denied")
}
