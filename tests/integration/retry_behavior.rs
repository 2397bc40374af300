//! Integration tests for retry and abort behavior
//!
//! Transient responses are retried on the same page under the injected
//! policy; an exhausted budget aborts the collection without advancing.

use issue_data_downloader::checkpoint::CheckpointStore;
use issue_data_downloader::fetcher::{
    CollectionFetcher, CollectionOutcome, FetchConfig, RetryPolicy, SearchClient,
};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_json(start_at: usize, count: usize, total: usize) -> serde_json::Value {
    let issues: Vec<serde_json::Value> = (0..count)
        .map(|i| serde_json::json!({"key": format!("KAFKA-{}", start_at + i)}))
        .collect();
    serde_json::json!({
        "startAt": start_at,
        "maxResults": 50,
        "total": total,
        "issues": issues,
    })
}

fn make_fetcher(uri: &str, dir: &Path) -> CollectionFetcher {
    let client = SearchClient::new(uri).unwrap();
    let store = CheckpointStore::new(dir).unwrap();
    CollectionFetcher::new(client, store)
        .with_policy(RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
            rate_limit_floor: Duration::from_millis(10),
        })
        .with_config(FetchConfig {
            page_size: 50,
            max_results: None,
            politeness_delay: Duration::ZERO,
            show_progress: false,
        })
}

#[tokio::test]
async fn transient_sequence_recovers_with_exactly_one_checkpoint() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    // 429, 500, 500, then success — all for the same page. Mounted mocks are
    // consulted in order; expired ones stop matching.
    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 20, 20)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path());
    let report = fetcher.fetch_collection("KAFKA").await.unwrap();

    assert_eq!(report.outcome, CollectionOutcome::Completed);
    assert_eq!(report.requests, 4);
    assert_eq!(report.retries, 3);
    assert_eq!(report.pages_fetched, 1);

    // Exactly one checkpoint, from the final success
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1);
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("KAFKA_page_0.json")).unwrap())
            .unwrap();
    assert_eq!(stored["issues"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn exhausted_retry_budget_aborts_without_checkpoint_or_next_page() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;
    // The next page must never be attempted
    Mock::given(method("GET"))
        .and(query_param("startAt", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(50, 1, 51)))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path());
    let report = fetcher.fetch_collection("KAFKA").await.unwrap();

    assert_eq!(
        report.outcome,
        CollectionOutcome::Aborted {
            page: 0,
            attempts: 5
        }
    );
    assert_eq!(report.requests, 5);
    assert_eq!(report.retries, 4);
    assert!(!dir.path().join("KAFKA_page_0.json").exists());
}

#[tokio::test]
async fn abort_preserves_earlier_checkpoints_for_later_resume() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 50, 120)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "50"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path());
    let report = fetcher.fetch_collection("KAFKA").await.unwrap();

    assert!(report.outcome.is_aborted());
    assert_eq!(report.pages_fetched, 1);
    assert!(dir.path().join("KAFKA_page_0.json").exists());
    assert!(!dir.path().join("KAFKA_page_1.json").exists());

    // A later run resumes at page 1, not page 0
    let store = CheckpointStore::new(dir.path()).unwrap();
    let resume = store.resume_point("KAFKA", 50).unwrap();
    assert_eq!(resume.next_page, 1);
    assert!(!resume.complete);
}

#[tokio::test]
async fn non_retryable_client_error_aborts_immediately() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad jql"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path());
    let report = fetcher.fetch_collection("KAFKA").await.unwrap();

    assert_eq!(
        report.outcome,
        CollectionOutcome::Aborted {
            page: 0,
            attempts: 1
        }
    );
    assert_eq!(report.requests, 1);
    assert_eq!(report.retries, 0);
}
