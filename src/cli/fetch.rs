//! Fetch command implementation and the top-level CLI definition

use crate::checkpoint::CheckpointStore;
use crate::fetcher::{
    CollectionFetcher, CollectionOutcome, FetchConfig, RetryPolicy, SearchClient,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::CliError;

/// Default search endpoint
pub const DEFAULT_BASE_URL: &str = "https://issues.apache.org/jira/rest/api/2/search";

/// Parse and validate a page size value
fn parse_page_size(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value == 0 {
        return Err("page size must be at least 1".to_string());
    }
    Ok(value)
}

/// Issue Data Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "issue-data-downloader")]
#[command(about = "Fetch issue-tracker records and build an instruction-tuning dataset", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for raw page checkpoints
    #[arg(long, global = true, default_value = "data")]
    pub data_dir: PathBuf,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch raw issue pages with checkpointing and resume
    Fetch(FetchArgs),

    /// Transform checkpointed pages into a JSONL dataset
    Process(super::ProcessArgs),

    /// Validate the generated dataset or the raw checkpoints
    Validate(super::ValidateCommand),

    /// Fetch then process in one go
    Run(super::RunArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Collections (project keys) to fetch
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![
            "KAFKA".to_string(),
            "ZOOKEEPER".to_string(),
            "CASSANDRA".to_string(),
        ]
    )]
    pub collections: Vec<String>,

    /// Results requested per page
    #[arg(long, default_value_t = 50, value_parser = parse_page_size)]
    pub page_size: usize,

    /// Search endpoint URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-collection cap on fetched results (0 = unlimited)
    #[arg(long, default_value_t = 200)]
    pub max_results: usize,

    /// Maximum consecutive failed attempts per page (range: 1-20)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Politeness delay between successful requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub politeness_ms: u64,
}

impl FetchArgs {
    /// Execute the fetch command across all configured collections.
    ///
    /// One collection's abort never stops the others; the command fails only
    /// after every collection has been attempted, and only if at least one
    /// did not complete fully.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        for collection in &self.collections {
            if collection.trim().is_empty() {
                return Err(CliError::InvalidArgument(
                    "collection names must be non-empty".to_string(),
                ));
            }
        }

        let client = SearchClient::new(&self.base_url)?;
        let store = CheckpointStore::new(&cli.data_dir)?;
        let policy = RetryPolicy {
            max_attempts: self.max_retries,
            ..Default::default()
        };
        let config = FetchConfig {
            page_size: self.page_size,
            max_results: (self.max_results > 0).then_some(self.max_results),
            politeness_delay: Duration::from_millis(self.politeness_ms),
            show_progress: true,
        };
        let fetcher = CollectionFetcher::new(client, store)
            .with_policy(policy)
            .with_config(config);

        info!(
            collections = self.collections.len(),
            page_size = self.page_size,
            data_dir = %cli.data_dir.display(),
            "starting fetch"
        );

        let mut failed = 0;
        for collection in &self.collections {
            let report = fetcher.fetch_collection(collection).await?;
            match &report.outcome {
                CollectionOutcome::Completed => {
                    println!(
                        "{}: complete ({} pages fetched, {} skipped, {} issues, {} retries)",
                        report.collection,
                        report.pages_fetched,
                        report.pages_skipped,
                        report.issues_fetched,
                        report.retries
                    );
                }
                CollectionOutcome::Empty => {
                    println!("{}: empty, nothing to fetch", report.collection);
                }
                CollectionOutcome::Aborted { page, attempts } => {
                    println!(
                        "{}: ABORTED at page {} after {} attempt(s); {} page(s) remain checkpointed",
                        report.collection,
                        page,
                        attempts,
                        report.pages_fetched + report.pages_skipped
                    );
                    failed += 1;
                }
            }
            if report.pages_discarded > 0 {
                println!(
                    "{}: {} page(s) discarded due to malformed payloads",
                    report.collection, report.pages_discarded
                );
            }
        }

        if failed > 0 {
            Err(CliError::CollectionsFailed { failed })
        } else {
            Ok(())
        }
    }
}
