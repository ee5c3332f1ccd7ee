//! Error types for the relay domain.

use thiserror::Error;

/// Relay error type.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Operation required an existing chat history for the caller.
    #[error("no chat history for caller {0}")]
    HistoryNotFound(String),
    /// Prompt template is missing the transcript placeholder.
    #[error("prompt template contains no {{{{input}}}} placeholder")]
    InvalidTemplate,
    /// Subword tokenizer failed to encode or decode text.
    #[error("tokenizer error: {0}")]
    Tokenization(String),
    /// Upstream service answered with a non-success status.
    #[error("{service} returned status {status}")]
    UpstreamStatus {
        /// Which upstream service answered.
        service: &'static str,
        /// HTTP status code it returned.
        status: u16,
    },
    /// Completion service returned no usable text.
    #[error("completion response contained no choices")]
    EmptyCompletion,
    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl RelayError {
    /// Whether a retry at the adapter boundary may succeed.
    ///
    /// Programming and configuration errors are never retryable; only
    /// transport failures and throttling/server statuses are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpRequest(err) => err.is_timeout() || err.is_connect(),
            Self::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Convenience result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;
