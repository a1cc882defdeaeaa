use crate::test_fetcher;
use std::time::Duration;
use sumi_harvest::config::UserAgentConfig;
use sumi_harvest::fetch::{build_http_client, FetchResult, Fetcher, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>hi</body></html>")
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/page", mock_server.uri());
    match test_fetcher(3).fetch(&url).await {
        FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        } => {
            assert_eq!(final_url, url);
            assert_eq!(status_code, 200);
            assert!(content_type.starts_with("text/html"));
            assert_eq!(body, "<html><body>hi</body></html>");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = test_fetcher(3)
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await;

    assert!(matches!(result, FetchResult::HttpError { status_code: 500 }));
}

#[tokio::test]
async fn test_timeouts_are_retried_with_backoff() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&UserAgentConfig::default()).unwrap();
    let fetcher = Fetcher::new(
        client,
        Duration::from_millis(100),
        RetryPolicy::new(3, Duration::from_millis(50)),
    );

    let start = std::time::Instant::now();
    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    match result {
        FetchResult::NetworkError { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected network error, got {:?}", other),
    }
    // Three 100ms timeouts plus 100ms and 200ms of backoff
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_redirect_loop_fails_after_one_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&mock_server)
        .await;

    let result = test_fetcher(3)
        .fetch(&format!("{}/loop", mock_server.uri()))
        .await;

    match result {
        FetchResult::NetworkError { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_text_degrades_to_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body"))
        .mount(&mock_server)
        .await;

    let fetcher = test_fetcher(1);
    assert_eq!(
        fetcher.fetch_text(&format!("{}/ok", mock_server.uri())).await,
        Some("body".to_string())
    );
    assert_eq!(
        fetcher.fetch_text(&format!("{}/missing", mock_server.uri())).await,
        None
    );
}
