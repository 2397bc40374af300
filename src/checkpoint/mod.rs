//! Checkpoint persistence for resumable fetches
//!
//! One file per (collection, page index), written atomically, never mutated.
//! Which files exist *is* the progress record — there is no separate state
//! file to keep in sync.

pub mod store;

pub use store::{CheckpointStore, ResumePoint};

/// Errors related to checkpoint persistence
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// A checkpoint for this key already exists
    #[error("checkpoint already exists: {0}")]
    AlreadyExists(String),
}
