//! Integration tests for pagination termination
//!
//! The loop stops on a short page, on the declared total, or on the
//! configured per-collection cap — without issuing a further request.

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
        .map(|i| serde_json::json!({"key": format!("CASSANDRA-{}", start_at + i)}))
        .collect();
    serde_json::json!({
        "startAt": start_at,
        "maxResults": 50,
        "total": total,
        "issues": issues,
    })
}

fn make_fetcher(uri: &str, dir: &Path, max_results: Option<usize>) -> CollectionFetcher {
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
            max_results,
            politeness_delay: Duration::ZERO,
            show_progress: false,
        })
}

#[tokio::test]
async fn short_page_terminates_without_further_requests() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 50, 80)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(50, 30, 80)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(100, 0, 80)))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path(), None);
    let report = fetcher.fetch_collection("CASSANDRA").await.unwrap();

    assert_eq!(report.outcome, CollectionOutcome::Completed);
    assert_eq!(report.requests, 2);
    assert_eq!(report.issues_fetched, 80);
}

#[tokio::test]
async fn declared_total_terminates_after_full_final_page() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 50, 100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(50, 50, 100)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(100, 0, 100)))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path(), None);
    let report = fetcher.fetch_collection("CASSANDRA").await.unwrap();

    assert_eq!(report.outcome, CollectionOutcome::Completed);
    assert_eq!(report.requests, 2);
}

#[tokio::test]
async fn result_cap_bounds_the_fetch() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 50, 100_000)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(50, 50, 100_000)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("startAt", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(100, 50, 100_000)))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path(), Some(100));
    let report = fetcher.fetch_collection("CASSANDRA").await.unwrap();

    assert_eq!(report.outcome, CollectionOutcome::Completed);
    assert_eq!(report.requests, 2);
    assert_eq!(report.issues_fetched, 100);
}

#[tokio::test]
async fn empty_collection_is_reported_as_empty_and_stays_resumable() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(0, 0, 0)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = make_fetcher(&server.uri(), dir.path(), None);
    let report = fetcher.fetch_collection("CASSANDRA").await.unwrap();

    assert_eq!(report.outcome, CollectionOutcome::Empty);
    assert_eq!(report.requests, 1);

    // The empty terminal page is checkpointed, so a re-run is zero-request
    let second = fetcher.fetch_collection("CASSANDRA").await.unwrap();
    assert_eq!(second.requests, 0);
}
