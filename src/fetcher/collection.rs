//! Resumable paginated fetch loop
//!
//! Drives page-by-page retrieval for one collection at a time: pages whose
//! checkpoint already exists are skipped without a network call, every
//! successful page is checkpointed before the cursor advances, and transient
//! failures are retried under the injected [`RetryPolicy`].

use crate::checkpoint::CheckpointStore;
use crate::fetcher::http::SearchClient;
use crate::fetcher::retry::RetryPolicy;
use crate::fetcher::{FetcherError, FetcherResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default number of results requested per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default pause between successive successful requests.
/// The upstream tracker is a shared public service.
pub const POLITENESS_DELAY_MS: u64 = 500;

/// Tuning knobs for a fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Results requested per page
    pub page_size: usize,
    /// Per-collection cap on fetched results; `None` fetches everything
    pub max_results: Option<usize>,
    /// Pause between successive successful requests
    pub politeness_delay: Duration,
    /// Render a progress bar while fetching
    pub show_progress: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_results: None,
            politeness_delay: Duration::from_millis(POLITENESS_DELAY_MS),
            show_progress: false,
        }
    }
}

/// How a collection fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// Every page up to the last one is checkpointed
    Completed,
    /// The collection has no results at all
    Empty,
    /// Retry budget exhausted (or a non-retryable response) on `page`;
    /// earlier checkpoints remain valid and a later run resumes from them
    Aborted {
        /// Page index that could not be fetched
        page: usize,
        /// Consecutive attempts spent on that page
        attempts: u32,
    },
}

impl CollectionOutcome {
    /// Whether the collection failed to complete fully.
    pub fn is_aborted(&self) -> bool {
        matches!(self, CollectionOutcome::Aborted { .. })
    }
}

/// Per-collection fetch statistics.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Collection this report covers
    pub collection: String,
    /// How the fetch ended
    pub outcome: CollectionOutcome,
    /// Pages fetched over the network this run
    pub pages_fetched: usize,
    /// Pages skipped because their checkpoint already existed
    pub pages_skipped: usize,
    /// Pages discarded because the payload was malformed
    pub pages_discarded: usize,
    /// Issues received this run
    pub issues_fetched: usize,
    /// Network requests issued
    pub requests: usize,
    /// Backoff retries performed
    pub retries: usize,
}

impl FetchReport {
    fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            outcome: CollectionOutcome::Completed,
            pages_fetched: 0,
            pages_skipped: 0,
            pages_discarded: 0,
            issues_fetched: 0,
            requests: 0,
            retries: 0,
        }
    }
}

/// JQL query selecting a collection's issues, newest first.
fn jql_for(collection: &str) -> String {
    format!("project = {collection} ORDER BY created DESC")
}

/// Fetches collections page by page with checkpoint resume.
pub struct CollectionFetcher {
    client: SearchClient,
    store: CheckpointStore,
    policy: RetryPolicy,
    config: FetchConfig,
}

impl CollectionFetcher {
    /// Create a fetcher with the default policy and configuration.
    pub fn new(client: SearchClient, store: CheckpointStore) -> Self {
        Self {
            client,
            store,
            policy: RetryPolicy::default(),
            config: FetchConfig::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the fetch configuration.
    pub fn with_config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Fetch every remaining page of one collection.
    ///
    /// The starting page is recomputed from existing checkpoints; a fully
    /// checkpointed collection issues no requests at all. Errors are
    /// contained at page granularity — the returned report says how the
    /// collection ended. `Err` is reserved for invalid inputs and checkpoint
    /// persistence failures, which must stop the process loudly.
    pub async fn fetch_collection(&self, collection: &str) -> FetcherResult<FetchReport> {
        if collection.trim().is_empty() {
            return Err(FetcherError::InvalidRequest(
                "collection name must be non-empty".to_string(),
            ));
        }
        let page_size = self.config.page_size;
        if page_size == 0 {
            return Err(FetcherError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }

        let mut report = FetchReport::new(collection);
        let jql = jql_for(collection);

        let resume = self.store.resume_point(collection, page_size)?;
        report.pages_skipped = resume.next_page;
        if resume.next_page > 0 {
            info!(
                collection,
                resumed_pages = resume.next_page,
                "resuming from existing checkpoints"
            );
        }
        if resume.complete {
            info!(collection, "collection already fully fetched, nothing to do");
            return Ok(report);
        }

        let bar = self.progress_bar(collection);
        bar.inc((resume.next_page * page_size) as u64);

        let mut page = resume.next_page;
        let mut offset = page * page_size;
        let mut failures: u32 = 0;
        let mut backoff_step: u32 = 0;
        let mut total: Option<usize> = None;

        loop {
            if let Some(cap) = self.config.max_results {
                if offset >= cap {
                    debug!(collection, offset, cap, "result cap reached");
                    break;
                }
            }
            if let Some(t) = total {
                if offset >= t {
                    debug!(collection, offset, total = t, "declared total reached");
                    break;
                }
            }

            // Resume path: an existing checkpoint means the page is complete
            // and must not be re-fetched.
            if self.store.exists(collection, page) {
                debug!(collection, page, "checkpoint exists, skipping page");
                report.pages_skipped += 1;
                bar.inc(page_size as u64);
                page += 1;
                offset += page_size;
                continue;
            }

            let result = self.client.fetch_page(&jql, offset, page_size).await;
            report.requests += 1;

            match result {
                Ok(raw) => {
                    self.store.write(collection, page, &raw.body)?;
                    failures = 0;
                    backoff_step = 0;

                    let count = raw.page.issues.len();
                    report.pages_fetched += 1;
                    report.issues_fetched += count;
                    total = Some(raw.page.total);
                    bar.inc(count as u64);
                    debug!(collection, page, count, total = raw.page.total, "page checkpointed");

                    if raw.page.is_last(page_size) {
                        break;
                    }
                    page += 1;
                    offset += page_size;
                    tokio::time::sleep(self.config.politeness_delay).await;
                }
                Err(e) if e.is_retryable() => {
                    failures += 1;
                    if failures >= self.policy.max_attempts {
                        error!(
                            collection,
                            page,
                            attempts = failures,
                            error = %e,
                            "retry budget exhausted, aborting collection"
                        );
                        report.outcome = CollectionOutcome::Aborted {
                            page,
                            attempts: failures,
                        };
                        bar.abandon();
                        return Ok(report);
                    }

                    let delay = self.policy.delay_for(&e, backoff_step);
                    if self.policy.advances_backoff(&e) {
                        backoff_step += 1;
                    }
                    warn!(
                        collection,
                        page,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, backing off"
                    );
                    report.retries += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(FetcherError::MalformedPayload(msg)) => {
                    // Not transient: the same request would return the same
                    // broken body. The page is reported and left without a
                    // checkpoint; the loss surfaces in the report.
                    warn!(
                        collection,
                        page,
                        reason = %msg,
                        "malformed payload, skipping page without checkpoint"
                    );
                    report.pages_discarded += 1;
                    failures = 0;
                    backoff_step = 0;
                    page += 1;
                    offset += page_size;
                    tokio::time::sleep(self.config.politeness_delay).await;
                }
                Err(e) => {
                    error!(
                        collection,
                        page,
                        error = %e,
                        "non-retryable failure, aborting collection"
                    );
                    report.outcome = CollectionOutcome::Aborted {
                        page,
                        attempts: failures + 1,
                    };
                    bar.abandon();
                    return Ok(report);
                }
            }
        }

        bar.finish_and_clear();

        if report.issues_fetched == 0
            && report.pages_skipped == 0
            && report.pages_discarded == 0
        {
            info!(collection, "collection is empty");
            report.outcome = CollectionOutcome::Empty;
        } else {
            info!(
                collection,
                pages = report.pages_fetched,
                skipped = report.pages_skipped,
                issues = report.issues_fetched,
                "collection complete"
            );
        }

        Ok(report)
    }

    fn progress_bar(&self, collection: &str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let bar = match self.config.max_results {
            Some(cap) => ProgressBar::new(cap as u64),
            None => ProgressBar::new_spinner(),
        };
        bar.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("Fetching {collection}"));
        bar
    }
}
