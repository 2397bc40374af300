//! Transformation of checkpointed pages into a JSONL dataset
//!
//! Reads the checkpoint directory the fetcher produced, deduplicates issues
//! by key with a single-pass set, and writes one training record per line.

pub mod template;

pub use template::{RecordMeta, TaskKind, TrainingRecord};

use crate::SearchPage;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Processor errors
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Record serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Statistics from one processing pass.
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    /// Checkpoint files read successfully
    pub files_read: usize,
    /// Checkpoint files skipped because they failed to parse
    pub corrupt_files: usize,
    /// Issues encountered across all pages
    pub issues_seen: usize,
    /// Issues dropped as duplicates of an earlier key
    pub duplicates: usize,
    /// Training records written
    pub records_written: usize,
}

/// Reads checkpoint pages and writes the JSONL dataset.
pub struct Processor {
    data_dir: PathBuf,
    output_path: PathBuf,
}

impl Processor {
    /// Create a processor over `data_dir`, writing to `output_path`.
    pub fn new(data_dir: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_path: output_path.into(),
        }
    }

    /// Run the full pass: read, deduplicate, format, write.
    pub fn process(&self) -> Result<ProcessReport, ProcessError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.data_dir)
            .map_err(|e| ProcessError::Io(format!("reading {}: {e}", self.data_dir.display())))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let out = File::create(&self.output_path)
            .map_err(|e| ProcessError::Io(format!("creating {}: {e}", self.output_path.display())))?;
        let mut writer = BufWriter::new(out);

        let mut report = ProcessReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        for path in files {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ProcessError::Io(format!("reading {}: {e}", path.display())))?;

            let page: SearchPage = match serde_json::from_str(&contents) {
                Ok(page) => page,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping corrupt checkpoint file");
                    report.corrupt_files += 1;
                    continue;
                }
            };
            report.files_read += 1;

            for issue in &page.issues {
                report.issues_seen += 1;
                if !seen.insert(issue.key.clone()) {
                    report.duplicates += 1;
                    continue;
                }

                for record in template::records_for(issue) {
                    let line = serde_json::to_string(&record)
                        .map_err(|e| ProcessError::Serialization(e.to_string()))?;
                    writeln!(writer, "{line}")
                        .map_err(|e| ProcessError::Io(format!("writing dataset: {e}")))?;
                    report.records_written += 1;
                }
            }
            debug!(file = %path.display(), issues = page.issues.len(), "page processed");
        }

        writer
            .flush()
            .map_err(|e| ProcessError::Io(format!("flushing dataset: {e}")))?;

        info!(
            files = report.files_read,
            issues = report.issues_seen,
            duplicates = report.duplicates,
            records = report.records_written,
            output = %self.output_path.display(),
            "processing complete"
        );
        Ok(report)
    }
}
