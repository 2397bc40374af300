//! Instruction templates for training records
//!
//! Each issue yields up to four records, one per task the issue has enough
//! material for. Outputs are taken from the issue itself (status fields, the
//! title, the discussion), so every record has a deterministic reference
//! answer.

use crate::Issue;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Source tag stamped into every record's metadata
pub const SOURCE_NAME: &str = "Apache Jira";

/// Base URL for the human-readable issue view
pub const BROWSE_URL_BASE: &str = "https://issues.apache.org/jira/browse";

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Collapse whitespace runs to single spaces and trim, so records stay
/// one-line-per-entry in the JSONL output.
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Task a training record was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Predict status and priority from the report and discussion
    Classification,
    /// Produce a one-line summary of the report
    Summarization,
    /// Write a first response to the reporter
    Qna,
    /// Identify the likely root cause of a resolved issue
    RootCauseAnalysis,
}

impl TaskKind {
    /// Stable name used in record metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Classification => "classification",
            TaskKind::Summarization => "summarization",
            TaskKind::Qna => "qna",
            TaskKind::RootCauseAnalysis => "root_cause_analysis",
        }
    }

    /// All known task names, in metadata form.
    pub fn all_names() -> [&'static str; 4] {
        [
            TaskKind::Classification.as_str(),
            TaskKind::Summarization.as_str(),
            TaskKind::Qna.as_str(),
            TaskKind::RootCauseAnalysis.as_str(),
        ]
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata block of a training record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMeta {
    /// Data source tag
    pub source: String,
    /// Issue key the record was derived from
    pub id: String,
    /// Human-readable issue URL
    pub url: String,
    /// Task name
    pub task: String,
}

/// One instruction-tuning example in instruction/input/output form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
    /// Provenance and task metadata
    pub meta: RecordMeta,
    /// Task instruction
    pub instruction: String,
    /// Task input assembled from the issue
    pub input: String,
    /// Reference output
    pub output: String,
}

fn meta_for(issue: &Issue, task: TaskKind) -> RecordMeta {
    RecordMeta {
        source: SOURCE_NAME.to_string(),
        id: issue.key.clone(),
        url: format!("{BROWSE_URL_BASE}/{}", issue.key),
        task: task.as_str().to_string(),
    }
}

fn comments_text(bodies: &[&str]) -> String {
    if bodies.is_empty() {
        return "No comments.".to_string();
    }
    bodies
        .iter()
        .map(|b| format!("- {}", clean_text(b)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_resolved(issue: &Issue) -> bool {
    matches!(
        issue.status_name().to_lowercase().as_str(),
        "resolved" | "closed" | "done"
    )
}

/// Build every training record the issue has material for.
pub fn records_for(issue: &Issue) -> Vec<TrainingRecord> {
    let summary = clean_text(issue.fields.summary.as_deref().unwrap_or(""));
    let description = clean_text(issue.fields.description.as_deref().unwrap_or(""));
    let comments = issue.comment_bodies();
    let comments_joined = comments_text(&comments);

    let mut records = Vec::new();

    // Classification is always emitted; status and priority fall back to
    // "Unknown" rather than dropping the example.
    records.push(TrainingRecord {
        meta: meta_for(issue, TaskKind::Classification),
        instruction: "Analyze the issue description and discussion to determine the current \
                      status and priority."
            .to_string(),
        input: format!(
            "Title: {summary}\nDescription: {description}\nComments: {comments_joined}"
        ),
        output: format!(
            "Status: {}\nPriority: {}",
            issue.status_name(),
            issue.priority_name()
        ),
    });

    // Summarization uses the title as the reference summary, so it needs
    // both a title and a body to summarize.
    if !summary.is_empty() && !description.is_empty() {
        records.push(TrainingRecord {
            meta: meta_for(issue, TaskKind::Summarization),
            instruction: "Summarize the following issue report in a single sentence.".to_string(),
            input: format!("Description: {description}\nComments: {comments_joined}"),
            output: summary.clone(),
        });
    }

    // The first reply is the reference response to the report.
    if let Some(first) = comments.first() {
        records.push(TrainingRecord {
            meta: meta_for(issue, TaskKind::Qna),
            instruction: "Read the issue report and write a helpful first response to the \
                          reporter."
                .to_string(),
            input: format!("Title: {summary}\nDescription: {description}"),
            output: clean_text(first),
        });
    }

    // Root cause analysis only makes sense once the issue is settled; the
    // closing comment is the reference analysis.
    if is_resolved(issue) {
        if let Some(last) = comments.last() {
            let earlier = comments_text(&comments[..comments.len() - 1]);
            records.push(TrainingRecord {
                meta: meta_for(issue, TaskKind::RootCauseAnalysis),
                instruction: "Identify the most likely root cause of the issue from the \
                              description and discussion."
                    .to_string(),
                input: format!(
                    "Title: {summary}\nDescription: {description}\nComments: {earlier}"
                ),
                output: clean_text(last),
            });
        }
    }

    records
}
