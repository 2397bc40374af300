//! Unit tests for dataset validation against generated records

use issue_data_downloader::cli::validate::validate_dataset;
use issue_data_downloader::processor::template::records_for;
use issue_data_downloader::{Comment, CommentList, Issue, IssueFields, NamedField};
use std::io::Write;

fn sample_issue() -> Issue {
    Issue {
        key: "KAFKA-100".to_string(),
        fields: IssueFields {
            summary: Some("Consumer stalls under load".to_string()),
            description: Some("Rebalance loop observed\nwith many partitions".to_string()),
            status: Some(NamedField {
                name: Some("Resolved".to_string()),
            }),
            priority: Some(NamedField {
                name: Some("Critical".to_string()),
            }),
            comment: Some(CommentList {
                comments: vec![
                    Comment {
                        body: Some("Which broker version?".to_string()),
                    },
                    Comment {
                        body: Some("Root cause: session timeout too low".to_string()),
                    },
                ],
            }),
            ..Default::default()
        },
    }
}

#[test]
fn generated_records_validate_cleanly() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("dataset.jsonl");

    let mut file = std::fs::File::create(&path).unwrap();
    for record in records_for(&sample_issue()) {
        writeln!(file, "{}", serde_json::to_string(&record).unwrap()).unwrap();
    }

    let report = validate_dataset(&path).unwrap();
    assert_eq!(report.lines, 4);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.unique_ids.len(), 1);
    for task in ["classification", "summarization", "qna", "root_cause_analysis"] {
        assert_eq!(report.task_counts[task], 1, "missing task {task}");
    }
}

#[test]
fn mixed_good_and_bad_lines_are_both_counted() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("dataset.jsonl");

    let good = serde_json::to_string(&records_for(&sample_issue())[0]).unwrap();
    std::fs::write(&path, format!("{good}\nnot json at all\n")).unwrap();

    let report = validate_dataset(&path).unwrap();
    assert_eq!(report.lines, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.task_counts["classification"], 1);
}

#[test]
fn missing_file_is_an_argument_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.jsonl");
    assert!(validate_dataset(&missing).is_err());
}
