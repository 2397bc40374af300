//! Validation subcommand
//!
//! Structural validation of the generated JSONL dataset and of the raw
//! checkpoint directory. The dataset check mirrors what downstream training
//! tooling requires: every line is JSON with `meta`/`instruction`/`input`/
//! `output`, every `meta` carries `source`/`id`/`url`/`task`, and the task
//! name is one of the known templates.

use crate::processor::TaskKind;
use crate::SearchPage;
use clap::Parser;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::CliError;

/// Required top-level fields of every dataset record
const REQUIRED_FIELDS: [&str; 4] = ["meta", "instruction", "input", "output"];

/// Required fields of every record's meta block
const REQUIRED_META_FIELDS: [&str; 4] = ["source", "id", "url", "task"];

/// How many errors/warnings to print before truncating
const MAX_SHOWN_ERRORS: usize = 20;
const MAX_SHOWN_WARNINGS: usize = 10;

/// Validate command for checking datasets and checkpoints
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// What to validate
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// Target type for validation
#[derive(clap::Subcommand, Debug)]
pub enum ValidateTarget {
    /// Validate a generated JSONL dataset
    Dataset {
        /// Path to the dataset file
        #[arg(default_value = "issue_dataset.jsonl")]
        path: PathBuf,
    },
    /// Validate raw checkpoint files
    Checkpoints {
        /// Checkpoint directory
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

/// Findings from a dataset validation pass.
#[derive(Debug, Default)]
pub struct DatasetReport {
    /// Lines inspected
    pub lines: usize,
    /// Distinct issue ids seen in record metadata
    pub unique_ids: HashSet<String>,
    /// Record count per task name
    pub task_counts: BTreeMap<String, usize>,
    /// Structural errors (any of these fails validation)
    pub errors: Vec<String>,
    /// Non-fatal oddities
    pub warnings: Vec<String>,
}

/// Validate a JSONL dataset file.
pub fn validate_dataset(path: &Path) -> Result<DatasetReport, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
    })?;

    let valid_tasks = TaskKind::all_names();
    let mut report = DatasetReport::default();
    for task in valid_tasks {
        report.task_counts.insert(task.to_string(), 0);
    }

    for (i, line) in contents.lines().enumerate() {
        let line_no = i + 1;
        report.lines = line_no;

        let entry: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                report.errors.push(format!("Line {line_no}: invalid JSON - {e}"));
                continue;
            }
        };

        for field in REQUIRED_FIELDS {
            if entry.get(field).is_none() {
                report
                    .errors
                    .push(format!("Line {line_no}: missing required field '{field}'"));
            }
        }

        if let Some(meta) = entry.get("meta") {
            for field in REQUIRED_META_FIELDS {
                if meta.get(field).is_none() {
                    report.errors.push(format!(
                        "Line {line_no}: missing required meta field '{field}'"
                    ));
                }
            }

            if let Some(task) = meta.get("task").and_then(|t| t.as_str()) {
                if valid_tasks.contains(&task) {
                    *report.task_counts.entry(task.to_string()).or_insert(0) += 1;
                } else {
                    report
                        .warnings
                        .push(format!("Line {line_no}: unknown task type '{task}'"));
                }
            }

            if let Some(id) = meta.get("id").and_then(|v| v.as_str()) {
                report.unique_ids.insert(id.to_string());
            }
        }

        for field in ["instruction", "input", "output"] {
            if let Some(value) = entry.get(field).and_then(|v| v.as_str()) {
                if value.trim().is_empty() {
                    report
                        .warnings
                        .push(format!("Line {line_no}: empty {field} field"));
                }
            }
        }
    }

    Ok(report)
}

impl ValidateCommand {
    /// Execute the validation command
    pub fn execute(&self) -> Result<(), CliError> {
        match &self.target {
            ValidateTarget::Dataset { path } => self.validate_dataset_file(path),
            ValidateTarget::Checkpoints { data_dir } => self.validate_checkpoints(data_dir),
        }
    }

    fn validate_dataset_file(&self, path: &Path) -> Result<(), CliError> {
        println!("Validating {}...", path.display());
        let report = validate_dataset(path)?;

        println!("\nTotal lines: {}", report.lines);
        println!("Unique issues: {}", report.unique_ids.len());
        println!("Task distribution:");
        for (task, count) in &report.task_counts {
            println!("  {task}: {count}");
        }

        if report.errors.is_empty() {
            println!("\nNo errors found");
        } else {
            println!("\nFound {} error(s):", report.errors.len());
            for error in report.errors.iter().take(MAX_SHOWN_ERRORS) {
                println!("  {error}");
            }
            if report.errors.len() > MAX_SHOWN_ERRORS {
                println!("  ... and {} more", report.errors.len() - MAX_SHOWN_ERRORS);
            }
        }

        if report.warnings.is_empty() {
            println!("No warnings");
        } else {
            println!("Found {} warning(s):", report.warnings.len());
            for warning in report.warnings.iter().take(MAX_SHOWN_WARNINGS) {
                println!("  {warning}");
            }
            if report.warnings.len() > MAX_SHOWN_WARNINGS {
                println!(
                    "  ... and {} more",
                    report.warnings.len() - MAX_SHOWN_WARNINGS
                );
            }
        }

        if report.errors.is_empty() {
            Ok(())
        } else {
            Err(CliError::ValidationFailed {
                errors: report.errors.len(),
            })
        }
    }

    fn validate_checkpoints(&self, data_dir: &Path) -> Result<(), CliError> {
        if !data_dir.exists() {
            println!("No checkpoint directory at {}", data_dir.display());
            return Ok(());
        }
        if !data_dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "{} is not a directory",
                data_dir.display()
            )));
        }

        let files: Vec<_> = std::fs::read_dir(data_dir)
            .map_err(|e| CliError::InvalidArgument(format!("failed to read checkpoint dir: {e}")))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if files.is_empty() {
            println!("Checkpoint directory exists but contains no page files");
            return Ok(());
        }

        println!("Found {} checkpoint file(s)", files.len());
        let mut valid_count = 0;
        let mut invalid_count = 0;

        for file in files {
            let path = file.path();
            let filename = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();

            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<SearchPage>(&content) {
                    Ok(page) => {
                        println!("  - {filename} ({} issue(s))", page.issues.len());
                        valid_count += 1;
                    }
                    Err(e) => {
                        println!("  - {filename} (invalid: {e})");
                        invalid_count += 1;
                    }
                },
                Err(e) => {
                    println!("  - {filename} (cannot read: {e})");
                    invalid_count += 1;
                }
            }
        }

        println!("\nSummary:");
        println!("  Valid files: {valid_count}");
        if invalid_count > 0 {
            println!("  Invalid files: {invalid_count}");
            return Err(CliError::InvalidArgument(format!(
                "found {invalid_count} invalid checkpoint file(s)"
            )));
        }

        Ok(())
    }
}
