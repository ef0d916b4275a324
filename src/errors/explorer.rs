// SPDX-License-Identifier: Apache-2.0

//! Errors from the block-explorer HTTP API client.

/// Errors that can occur when talking to a block-explorer API.
///
/// The explorer envelope reports failures in-band (`status: "0"`), and some
/// of those are not errors at all: a "No records found" reply is a terminal
/// empty result and is mapped to `Ok(vec![])` by the client, never to this
/// type.
#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    /// The HTTP request itself failed (connectivity, TLS, non-2xx status).
    #[error("explorer request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON envelope.
    #[error("malformed explorer response: {details}")]
    MalformedResponse {
        /// What failed to parse
        details: String,
    },

    /// The API reported a failure in its response envelope.
    #[error("explorer API error: {message}")]
    Api {
        /// The `message`/`result` text from the envelope
        message: String,
    },

    /// An operation requiring an API key was attempted without one.
    #[error("explorer API key not configured")]
    MissingApiKey,
}

impl ExplorerError {
    /// Create a `MalformedResponse` error with details.
    pub fn malformed(details: impl Into<String>) -> Self {
        ExplorerError::MalformedResponse {
            details: details.into(),
        }
    }

    /// Create an `Api` error from the envelope's failure text.
    pub fn api(message: impl Into<String>) -> Self {
        ExplorerError::Api {
            message: message.into(),
        }
    }

    /// True when the API signalled throttling; such errors get linear
    /// backoff before the bounded per-page retry.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ExplorerError::Api { message } => {
                let lower = message.to_ascii_lowercase();
                lower.contains("rate limit") || lower.contains("max rate")
            }
            ExplorerError::Http(e) => e
                .status()
                .is_some_and(|s| s == reqwest::StatusCode::TOO_MANY_REQUESTS),
            _ => false,
        }
    }
}
