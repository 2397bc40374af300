//! CLI error types and conversions

use crate::checkpoint::CheckpointError;
use crate::fetcher::FetcherError;
use crate::processor::ProcessError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Fetcher error
    #[error("fetcher error: {0}")]
    Fetcher(#[from] FetcherError),

    /// Checkpoint error
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// Processor error
    #[error("processor error: {0}")]
    Process(#[from] ProcessError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// At least one collection did not complete fully
    #[error("{failed} collection(s) did not complete fully; see the log for details")]
    CollectionsFailed {
        /// Number of collections that aborted
        failed: usize,
    },

    /// Dataset validation found structural errors
    #[error("dataset validation failed with {errors} error(s)")]
    ValidationFailed {
        /// Number of errors found
        errors: usize,
    },
}
