//! HTTP client for the issue search endpoint
//!
//! Provides a thin wrapper over reqwest that builds the offset/limit query,
//! classifies the response into the fetcher error taxonomy, and surfaces
//! structurally broken payloads as non-retryable data-quality errors.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::SearchPage;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout. A stalled response counts as a transient failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Field selection requested from the endpoint
const FIELDS: &str = "summary,description,status,priority,assignee,created,labels,comment";

/// A successfully fetched page: the parsed payload plus the exact response
/// body, which is what gets checkpointed.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Response body verbatim
    pub body: String,
    /// Parsed view of the same body
    pub page: SearchPage,
}

/// HTTP client for the search endpoint.
pub struct SearchClient {
    client: Client,
    base_url: String,
}

impl SearchClient {
    /// Create a client for the given search endpoint URL.
    pub fn new(base_url: impl Into<String>) -> FetcherResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetcherError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// The endpoint URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single page of results.
    ///
    /// Issues one GET request; no retrying happens here. The caller decides
    /// what to do with each error class:
    /// - 429 → [`FetcherError::RateLimited`] (retryable)
    /// - 5xx → [`FetcherError::ServerError`] (retryable)
    /// - transport failure → [`FetcherError::Network`] (retryable)
    /// - other 4xx → [`FetcherError::ClientError`] (not retryable)
    /// - 2xx with a broken body → [`FetcherError::MalformedPayload`]
    pub async fn fetch_page(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> FetcherResult<RawPage> {
        let params: [(&str, String); 4] = [
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", FIELDS.to_string()),
        ];

        debug!(start_at, max_results, "issuing search request");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(FetcherError::RateLimited);
        }

        if status.is_server_error() {
            return Err(FetcherError::ServerError(status.as_u16()));
        }

        if status.is_client_error() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable response body".to_string());
            return Err(FetcherError::ClientError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetcherError::Network(e.to_string()))?;

        let page = parse_payload(&body)?;
        Ok(RawPage { body, page })
    }
}

/// Parse a response body, distinguishing invalid JSON from a payload that is
/// valid JSON but missing the expected result array.
fn parse_payload(body: &str) -> FetcherResult<SearchPage> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| FetcherError::MalformedPayload(format!("invalid JSON: {e}")))?;

    if !value.get("issues").is_some_and(|v| v.is_array()) {
        return Err(FetcherError::MalformedPayload(
            "response missing issues array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| FetcherError::MalformedPayload(format!("unexpected payload shape: {e}")))
}
