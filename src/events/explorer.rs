// SPDX-License-Identifier: Apache-2.0

//! Explorer-backed approval sources with a shared pagination driver.
//!
//! Both the log-page and transaction-page backends walk the same loop:
//! request pages from 1 upward, stop on an empty or short page, retry each
//! page up to a small fixed bound (linear backoff on rate limits), and on
//! an unrecoverable page keep what was accumulated instead of failing the
//! scan. The loop lives in one place so the two backends cannot drift
//! apart the way hand-copied variants do.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, ChainId};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use super::ApprovalEventSource;
use crate::config::ScannerConfig;
use crate::errors::{ExplorerError, ScanError};
use crate::explorer::ExplorerApi;
use crate::types::ApprovalEvent;

/// Pagination and retry knobs shared by the explorer-backed sources.
#[derive(Debug, Clone)]
pub(crate) struct PageSettings {
    /// Requested entries per page; a shorter reply means exhaustion
    pub page_size: u64,
    /// Attempts per page before giving up on the rest of the history
    pub retries: u32,
    /// Linear backoff base for rate-limited pages (`attempt × base`)
    pub retry_base_delay: Duration,
    /// Pause between successive pages
    pub page_delay: Duration,
}

impl PageSettings {
    fn from_config(config: &ScannerConfig, page_size: u64) -> Self {
        Self {
            page_size,
            retries: config.explorer_page_retries.max(1),
            retry_base_delay: config.explorer_retry_base_delay,
            page_delay: config.explorer_page_delay,
        }
    }
}

/// Fetch one page within the retry bound. `None` means the page is
/// unrecoverable and pagination should stop with partial results.
async fn fetch_page_bounded<T, F, Fut>(
    settings: &PageSettings,
    page: u64,
    fetch: &F,
) -> Option<Vec<T>>
where
    F: Fn(u64) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<T>, ExplorerError>>,
{
    for attempt in 1..=settings.retries {
        match fetch(page).await {
            Ok(items) => return Some(items),
            Err(error) if attempt < settings.retries => {
                if error.is_rate_limited() {
                    let delay = settings.retry_base_delay * attempt;
                    warn!(
                        page,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Explorer rate limited, backing off"
                    );
                    sleep(delay).await;
                } else {
                    warn!(page, attempt, error = %error, "Explorer page failed, retrying");
                }
            }
            Err(error) => {
                warn!(
                    page,
                    error = %error,
                    "Explorer page failed after retries, keeping partial results"
                );
                return None;
            }
        }
    }
    None
}

/// Walk pages until exhaustion, accumulating results.
async fn collect_pages<T, F, Fut>(settings: &PageSettings, fetch: F) -> Vec<T>
where
    F: Fn(u64) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<T>, ExplorerError>>,
{
    let mut all = Vec::new();
    let mut page = 1u64;

    loop {
        let Some(items) = fetch_page_bounded(settings, page, &fetch).await else {
            return all;
        };
        if items.is_empty() {
            return all;
        }

        let short_page = (items.len() as u64) < settings.page_size;
        all.extend(items);
        if short_page {
            return all;
        }

        page += 1;
        if !settings.page_delay.is_zero() {
            sleep(settings.page_delay).await;
        }
    }
}

/// Approval history from the explorer's `logs.getLogs` endpoint.
pub struct ExplorerLogSource {
    api: Arc<dyn ExplorerApi>,
    chain_id: ChainId,
    settings: PageSettings,
}

impl ExplorerLogSource {
    /// Create a source for one chain.
    pub fn new(api: Arc<dyn ExplorerApi>, chain_id: ChainId, config: &ScannerConfig) -> Self {
        Self {
            api,
            chain_id,
            settings: PageSettings::from_config(config, config.explorer_log_page_size),
        }
    }
}

#[async_trait]
impl ApprovalEventSource for ExplorerLogSource {
    async fn fetch_approvals(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ScanError> {
        info!(%owner, from_block, to_block, "Scanning approval logs via explorer");

        let entries = collect_pages(&self.settings, |page| {
            self.api.approval_logs(
                self.chain_id,
                owner,
                from_block,
                to_block,
                page,
                self.settings.page_size,
            )
        })
        .await;

        let mut events = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.into_approval_event() {
                Some(event) => events.push(event),
                None => warn!("Skipping malformed explorer log entry"),
            }
        }

        info!(total_events = events.len(), "Finished explorer log scan");
        Ok(events)
    }
}

/// Approval history reconstructed from the account's transaction list.
///
/// Keeps only `approve(...)` calls; catches approvals on tokens whose logs
/// the explorer has not indexed, at the cost of missing approvals made
/// through intermediary contracts.
pub struct ExplorerTxSource {
    api: Arc<dyn ExplorerApi>,
    chain_id: ChainId,
    settings: PageSettings,
}

impl ExplorerTxSource {
    /// Create a source for one chain.
    pub fn new(api: Arc<dyn ExplorerApi>, chain_id: ChainId, config: &ScannerConfig) -> Self {
        Self {
            api,
            chain_id,
            settings: PageSettings::from_config(config, config.explorer_tx_page_size),
        }
    }
}

#[async_trait]
impl ApprovalEventSource for ExplorerTxSource {
    async fn fetch_approvals(
        &self,
        owner: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ApprovalEvent>, ScanError> {
        info!(%owner, from_block, to_block, "Scanning transaction list via explorer");

        let transactions = collect_pages(&self.settings, |page| {
            self.api.account_transactions(
                self.chain_id,
                owner,
                from_block,
                to_block,
                page,
                self.settings.page_size,
            )
        })
        .await;

        let total = transactions.len();
        let events: Vec<ApprovalEvent> = transactions
            .into_iter()
            .filter(|tx| tx.is_approval())
            .filter_map(|tx| tx.into_approval_event())
            .collect();

        info!(
            total_transactions = total,
            approvals = events.len(),
            "Finished explorer transaction scan"
        );
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn settings(page_size: u64) -> PageSettings {
        PageSettings {
            page_size,
            retries: 2,
            retry_base_delay: Duration::from_millis(1),
            page_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_short_page_terminates() {
        let requests = AtomicU64::new(0);
        let collected = collect_pages(&settings(3), |page| {
            requests.fetch_add(1, Ordering::Relaxed);
            async move {
                // Page 1 full, page 2 short
                Ok(match page {
                    1 => vec![1, 2, 3],
                    2 => vec![4],
                    _ => panic!("pagination should have stopped"),
                })
            }
        })
        .await;

        assert_eq!(collected, vec![1, 2, 3, 4]);
        assert_eq!(requests.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_keeps_prefix() {
        let collected = collect_pages(&settings(2), |page| async move {
            match page {
                1 => Ok(vec![1, 2]),
                _ => Err(ExplorerError::api("backend exploded")),
            }
        })
        .await;

        // Page 2 failed both attempts; page 1 survives
        assert_eq!(collected, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_then_succeeds() {
        let attempts = AtomicU64::new(0);
        let collected = collect_pages(&settings(10), |_page| {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed);
            async move {
                if attempt == 0 {
                    Err(ExplorerError::api("Max rate limit reached"))
                } else {
                    Ok(vec![7])
                }
            }
        })
        .await;

        assert_eq!(collected, vec![7]);
        assert_eq!(attempts.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let collected: Vec<u8> = collect_pages(&settings(5), |_page| async move { Ok(vec![]) }).await;
        assert!(collected.is_empty());
    }
}
