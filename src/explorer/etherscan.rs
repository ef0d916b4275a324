// SPDX-License-Identifier: Apache-2.0

//! Etherscan v2 multichain API client.
//!
//! All supported chains share one base URL, disambiguated by a `chainid`
//! query parameter. Responses use the `{status, message, result}` envelope;
//! `status: "0"` with a "No transactions found" / "No records found"
//! message is a terminal empty result, not an error.

use alloy_primitives::{Address, ChainId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ContractSource, ExplorerApi, ExplorerLogEntry, ExplorerTxEntry};
use crate::config::constants::ETHERSCAN_V2_API;
use crate::erc20::approval_topic;
use crate::errors::ExplorerError;

/// Client for the Etherscan v2 API family.
///
/// # Examples
///
/// ```rust,ignore
/// use allowscan::EtherscanClient;
///
/// let client = EtherscanClient::new("YourApiKeyToken");
/// let source = client.contract_source(1, router_address).await?;
/// ```
#[derive(Debug, Clone)]
pub struct EtherscanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    /// Create a client against the public Etherscan v2 endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ETHERSCAN_V2_API.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Point the client at a different base URL (self-hosted explorers,
    /// test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get(
        &self,
        chain_id: ChainId,
        params: &[(&str, String)],
    ) -> Result<Envelope, ExplorerError> {
        if self.api_key.is_empty() {
            return Err(ExplorerError::MissingApiKey);
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("chainid", chain_id.to_string())])
            .query(params)
            .query(&[("apikey", self.api_key.clone())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Envelope>().await?)
    }
}

/// The `{status, message, result}` wrapper every endpoint responds with.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

impl Envelope {
    /// True for the "no data in this window/page" replies that terminate
    /// pagination successfully.
    fn is_terminal_empty(&self) -> bool {
        const TERMINAL: [&str; 2] = ["No transactions found", "No records found"];
        TERMINAL.contains(&self.message.as_str())
            || self
                .result
                .as_str()
                .is_some_and(|r| TERMINAL.contains(&r))
    }

    /// Failure text, preferring the `result` payload (which carries the
    /// specific reason, e.g. rate-limit details) over the generic message.
    fn error_text(&self) -> String {
        match self.result.as_str() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.message.clone(),
        }
    }

    fn into_list<T: DeserializeOwned>(self) -> Result<Vec<T>, ExplorerError> {
        if self.status == "1" {
            serde_json::from_value(self.result)
                .map_err(|e| ExplorerError::malformed(e.to_string()))
        } else if self.is_terminal_empty() {
            Ok(Vec::new())
        } else {
            Err(ExplorerError::api(self.error_text()))
        }
    }
}

/// Source-code entry shape of `contract.getsourcecode`.
#[derive(Debug, Deserialize)]
struct SourceCodeEntry {
    #[serde(rename = "ContractName", default)]
    contract_name: String,
}

#[async_trait]
impl ExplorerApi for EtherscanClient {
    async fn approval_logs(
        &self,
        chain_id: ChainId,
        owner: Address,
        from_block: u64,
        to_block: u64,
        page: u64,
        offset: u64,
    ) -> Result<Vec<ExplorerLogEntry>, ExplorerError> {
        debug!(chain_id, %owner, from_block, to_block, page, "Fetching approval log page");

        let envelope = self
            .get(
                chain_id,
                &[
                    ("module", "logs".to_string()),
                    ("action", "getLogs".to_string()),
                    ("fromBlock", from_block.to_string()),
                    ("toBlock", to_block.to_string()),
                    ("topic0", approval_topic().to_string()),
                    ("topic0_1_opr", "and".to_string()),
                    ("topic1", owner.into_word().to_string()),
                    ("page", page.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;

        envelope.into_list()
    }

    async fn account_transactions(
        &self,
        chain_id: ChainId,
        address: Address,
        from_block: u64,
        to_block: u64,
        page: u64,
        offset: u64,
    ) -> Result<Vec<ExplorerTxEntry>, ExplorerError> {
        debug!(chain_id, %address, from_block, to_block, page, "Fetching transaction page");

        let envelope = self
            .get(
                chain_id,
                &[
                    ("module", "account".to_string()),
                    ("action", "txlist".to_string()),
                    ("address", address.to_string()),
                    ("startblock", from_block.to_string()),
                    ("endblock", to_block.to_string()),
                    ("page", page.to_string()),
                    ("offset", offset.to_string()),
                    ("sort", "desc".to_string()),
                ],
            )
            .await?;

        envelope.into_list()
    }

    async fn contract_source(
        &self,
        chain_id: ChainId,
        address: Address,
    ) -> Result<ContractSource, ExplorerError> {
        debug!(chain_id, %address, "Fetching contract source metadata");

        let envelope = self
            .get(
                chain_id,
                &[
                    ("module", "contract".to_string()),
                    ("action", "getsourcecode".to_string()),
                    ("address", address.to_string()),
                ],
            )
            .await?;

        let entries: Vec<SourceCodeEntry> = envelope.into_list()?;
        let name = entries
            .into_iter()
            .next()
            .map(|entry| entry.contract_name)
            .filter(|name| !name.is_empty());

        Ok(match name {
            Some(name) => ContractSource::verified(name),
            None => ContractSource::unverified(),
        })
    }
}
