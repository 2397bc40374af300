//! Paginated fetching with retry, backoff, and checkpoint resume

pub mod collection;
pub mod http;
pub mod retry;

pub use collection::{CollectionFetcher, CollectionOutcome, FetchConfig, FetchReport};
pub use http::SearchClient;
pub use retry::RetryPolicy;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Rate limit response from the endpoint
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// Server-side error response
    #[error("server error: HTTP {0}")]
    ServerError(u16),

    /// Transport-level failure (timeout, connect, broken stream)
    #[error("network error: {0}")]
    Network(String),

    /// Non-retryable client error response
    #[error("client error: HTTP {status}: {message}")]
    ClientError {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        message: String,
    },

    /// Structurally broken payload (invalid JSON or missing result array)
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Checkpoint persistence failure
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] crate::checkpoint::CheckpointError),

    /// Invalid fetch parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetcherError {
    /// Whether the failure is transient and the same page should be retried.
    ///
    /// Rate limits, server errors, and transport failures are transient.
    /// Client errors and malformed payloads are not: repeating the identical
    /// request cannot change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetcherError::RateLimited | FetcherError::ServerError(_) | FetcherError::Network(_)
        )
    }
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;
