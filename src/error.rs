//! Typed errors for the content store client.

use thiserror::Error;

/// Errors produced while talking to the content store.
///
/// [`StoreError::NotConfigured`] is reported separately from transport and
/// decode failures: a deployment without credentials has not asked the store
/// anything, and must not be confused with an empty result set.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Required store settings are absent from the configuration.
    #[error("content store is not configured: missing {0}")]
    NotConfigured(&'static str),

    /// The HTTP request failed before a well-formed response arrived.
    #[error("content store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status code.
    #[error("content store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected envelope shape.
    #[error("could not decode content store response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// True when the failure is a deployment problem rather than a store one.
    pub fn is_configuration(&self) -> bool {
        matches!(self, StoreError::NotConfigured(_))
    }
}
