mod common;

use common::{init_tracing, test_fetch_config};
use news_digest::{DigestError, FetchConfig, Fetcher};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn retrying_config(max_retries: u32) -> FetchConfig {
    FetchConfig {
        max_retries,
        retry_delay_ms: 10,
        ..test_fetch_config()
    }
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(retrying_config(1)).unwrap();
    let body = fetcher
        .fetch_text(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "recovered");
    server.verify().await;
}

#[tokio::test]
async fn too_many_requests_is_retried() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1, 2]"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(retrying_config(2)).unwrap();
    let ids: Vec<u64> = fetcher
        .fetch_json(&format!("{}/busy", server.uri()))
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2]);
    server.verify().await;
}

#[tokio::test]
async fn retries_stop_after_the_configured_attempts() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(retrying_config(2)).unwrap();
    let result = fetcher.fetch_text(&format!("{}/down", server.uri())).await;

    assert!(matches!(result, Err(DigestError::Status { status: 500, .. })));
    server.verify().await;
}

#[tokio::test]
async fn client_error_is_not_retried() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(retrying_config(2)).unwrap();
    let result = fetcher.fetch_text(&format!("{}/missing", server.uri())).await;

    assert!(matches!(result, Err(DigestError::Status { status: 404, .. })));
    server.verify().await;
}

#[tokio::test]
async fn requests_to_the_same_host_are_spaced() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(3)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(300);
    let fetcher = Fetcher::new(FetchConfig {
        min_request_interval_ms: interval.as_millis() as u64,
        ..test_fetch_config()
    })
    .unwrap();

    let started = Instant::now();
    fetcher.fetch_text(&format!("{}/a", server.uri())).await.unwrap();
    fetcher.fetch_text(&format!("{}/b", server.uri())).await.unwrap();
    fetcher.fetch_text(&format!("{}/c", server.uri())).await.unwrap();

    // two waits between three requests
    assert!(started.elapsed() >= interval * 2);
    server.verify().await;
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2 * 1024 * 1024)))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(FetchConfig {
        max_body_size_mb: 1,
        ..test_fetch_config()
    })
    .unwrap();
    let result = fetcher.fetch_text(&format!("{}/huge", server.uri())).await;

    assert!(matches!(result, Err(DigestError::Parse(_))));
}
