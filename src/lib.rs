//! # Issue Data Downloader Library
//!
//! A library for fetching public issue-tracker records from a REST search API
//! and turning them into instruction-tuning training data. Designed around an
//! unreliable upstream: every page is checkpointed to disk the moment it
//! arrives, and an interrupted run resumes exactly where it left off.
//!
//! ## Features
//!
//! - **Checkpoint-per-page**: each fetched page is persisted atomically before
//!   the next request is issued
//! - **Resume Capability**: progress is reconstructed purely from which
//!   checkpoint files exist, with no separate state file
//! - **Retry with Backoff**: transient failures (429, 5xx, timeouts) are
//!   retried with an exponential backoff policy; a rate-limit response waits a
//!   fixed floor first
//! - **Dataset Generation**: checkpointed pages are deduplicated by issue key
//!   and reshaped into JSONL training records across several task templates
//! - **Validation**: structural validation of the generated dataset with
//!   error and warning reporting
//!
//! ## Quick Start
//!
//! ```no_run
//! use issue_data_downloader::checkpoint::CheckpointStore;
//! use issue_data_downloader::fetcher::{CollectionFetcher, SearchClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::new("https://issues.apache.org/jira/rest/api/2/search")?;
//! let store = CheckpointStore::new("data")?;
//!
//! let fetcher = CollectionFetcher::new(client, store);
//! let report = fetcher.fetch_collection("KAFKA").await?;
//! println!("{} pages fetched", report.pages_fetched);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Resilient paginated fetching with retry and backoff
//! - [`checkpoint`] - Per-page checkpoint persistence and resume scanning
//! - [`processor`] - Transformation of raw pages into JSONL training records
//! - [`cli`] - CLI command implementations

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Checkpoint persistence and resume scanning
pub mod checkpoint;

/// CLI command implementations
pub mod cli;

/// Paginated fetching with retry and backoff
pub mod fetcher;

/// Dataset generation from checkpointed pages
pub mod processor;

/// One page of search results as returned by the remote endpoint.
///
/// The `issues` array is deliberately *not* defaulted: a well-formed payload
/// must carry it, and its absence is how a structurally broken response is
/// detected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    /// Offset of the first result in this page
    #[serde(rename = "startAt", default)]
    pub start_at: usize,
    /// Page size the server applied
    #[serde(rename = "maxResults", default)]
    pub max_results: usize,
    /// Total number of results the collection declares
    #[serde(default)]
    pub total: usize,
    /// The issue records in this page
    pub issues: Vec<Issue>,
}

impl SearchPage {
    /// Whether this page is the last one for a given requested page size.
    pub fn is_last(&self, page_size: usize) -> bool {
        self.issues.len() < page_size
    }
}

/// A single issue record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    /// Tracker-wide issue key (e.g. "KAFKA-1234")
    pub key: String,
    /// Requested field selection
    #[serde(default)]
    pub fields: IssueFields,
}

/// The field selection requested from the endpoint.
///
/// Everything is optional; upstream records are frequently sparse and a
/// missing field must not fail the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IssueFields {
    /// One-line issue title
    #[serde(default)]
    pub summary: Option<String>,
    /// Free-form issue body
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status
    #[serde(default)]
    pub status: Option<NamedField>,
    /// Priority level
    #[serde(default)]
    pub priority: Option<NamedField>,
    /// Creation timestamp as reported by the tracker
    #[serde(default)]
    pub created: Option<String>,
    /// Labels attached to the issue
    #[serde(default)]
    pub labels: Vec<String>,
    /// Discussion thread
    #[serde(default)]
    pub comment: Option<CommentList>,
}

/// A tracker field that wraps its value in an object with a `name` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NamedField {
    /// Display name of the field value
    #[serde(default)]
    pub name: Option<String>,
}

/// Container for an issue's comment thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommentList {
    /// Comments in thread order
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A single comment in an issue's discussion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// Comment body text
    #[serde(default)]
    pub body: Option<String>,
}

impl Issue {
    /// Status display name, or "Unknown" when absent.
    pub fn status_name(&self) -> &str {
        self.fields
            .status
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Priority display name, or "Unknown" when absent.
    pub fn priority_name(&self) -> &str {
        self.fields
            .priority
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Non-empty comment bodies in thread order.
    pub fn comment_bodies(&self) -> Vec<&str> {
        self.fields
            .comment
            .as_ref()
            .map(|c| {
                c.comments
                    .iter()
                    .filter_map(|c| c.body.as_deref())
                    .filter(|b| !b.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
