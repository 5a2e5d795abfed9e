//! Error types for model calls.
//!
//! None of these reach a chat user directly: extraction falls back to
//! patterns and answers fall back to an apology.

use thiserror::Error;

/// Errors from the Messages API client.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-success status other than 401 or 429.
    #[error("API request failed: {0}")]
    ApiError(String),

    /// Status 429.
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Value of `retry-after`, or 60 when absent.
        retry_after_seconds: u64,
    },

    /// Empty key, or status 401.
    #[error("invalid API key")]
    InvalidApiKey,

    /// The reply was empty or held no usable JSON object.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Transport failure, including timeouts.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

/// Result type alias for model calls.
pub type Result<T> = std::result::Result<T, Error>;
