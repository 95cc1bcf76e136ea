use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::Config;
use crate::error::FetchError;
use crate::fetcher::test_helpers::{
    SAMPLE_PAGE, create_offline_manager, create_test_manager, create_test_manager_with_config,
    outcome_callbacks,
};
use crate::types::{Event, FetchRequest};

fn request_for(server: &MockServer, route: &str) -> FetchRequest {
    let url = url::Url::parse(&format!("{}{}", server.uri(), route)).unwrap();
    FetchRequest::new(url)
}

#[tokio::test]
async fn test_download_delivers_accumulated_body_on_success() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
        .mount(&mock_server)
        .await;

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    let id = manager
        .download(request_for(&mock_server, "/page"), on_success, on_failure)
        .await;

    assert!(id.is_some(), "a reachable download should register a task");

    let bytes = outcome.recv().await.unwrap().unwrap();
    assert_eq!(
        bytes,
        SAMPLE_PAGE.as_bytes(),
        "the success callback should receive the full response body"
    );

    assert_eq!(
        manager.active_count().await,
        0,
        "the registry should drain once the transfer resolves"
    );
}

#[tokio::test]
async fn test_download_unreachable_network_fails_synchronously() {
    let manager = create_offline_manager();

    let url = url::Url::parse("http://localhost:1/page").unwrap();
    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    let id = manager
        .download(FetchRequest::new(url), on_success, on_failure)
        .await;

    assert!(id.is_none(), "no task should be created when offline");

    // The failure callback ran inside download(), before it returned.
    let error = outcome.try_recv().unwrap().unwrap_err();
    assert_eq!(error, FetchError::NotConnected);

    assert_eq!(
        manager.active_count().await,
        0,
        "a refused download must not appear in the registry"
    );
}

#[tokio::test]
async fn test_download_non_200_status_fails_with_not_found() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>gone</html>"))
        .mount(&mock_server)
        .await;

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    manager
        .download(request_for(&mock_server, "/missing"), on_success, on_failure)
        .await;

    let error = outcome.recv().await.unwrap().unwrap_err();
    assert_eq!(
        error,
        FetchError::NotFound,
        "a non-200 status should fail the task with NotFound"
    );

    assert_eq!(manager.active_count().await, 0);
}

#[tokio::test]
async fn test_download_emits_lifecycle_events_in_order() {
    let manager = create_test_manager();
    let mut events = manager.subscribe();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
        .mount(&mock_server)
        .await;

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    let id = manager
        .download(request_for(&mock_server, "/page"), on_success, on_failure)
        .await
        .unwrap();
    outcome.recv().await.unwrap().unwrap();

    match events.recv().await.unwrap() {
        Event::Started { id: event_id, url } => {
            assert_eq!(event_id, id);
            assert!(url.ends_with("/page"));
        }
        other => panic!("expected Started, got {other:?}"),
    }

    match events.recv().await.unwrap() {
        Event::ResponseReceived {
            id: event_id,
            status,
            expected_size,
        } => {
            assert_eq!(event_id, id);
            assert_eq!(status, 200);
            assert_eq!(
                expected_size,
                Some(SAMPLE_PAGE.len() as u64),
                "the content length advertised by the response should be recorded"
            );
        }
        other => panic!("expected ResponseReceived, got {other:?}"),
    }

    match events.recv().await.unwrap() {
        Event::Completed { id: event_id, bytes } => {
            assert_eq!(event_id, id);
            assert_eq!(bytes, SAMPLE_PAGE.len() as u64);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_downloads_do_not_share_buffers() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    let body_a = "A".repeat(4096);
    let body_b = "B".repeat(4096);
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body_a.clone())
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body_b.clone())
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .mount(&mock_server)
        .await;

    let (success_a, failure_a, mut outcome_a) = outcome_callbacks();
    let (success_b, failure_b, mut outcome_b) = outcome_callbacks();

    manager
        .download(request_for(&mock_server, "/a"), success_a, failure_a)
        .await;
    manager
        .download(request_for(&mock_server, "/b"), success_b, failure_b)
        .await;

    let bytes_a = outcome_a.recv().await.unwrap().unwrap();
    let bytes_b = outcome_b.recv().await.unwrap().unwrap();

    assert_eq!(
        bytes_a,
        body_a.as_bytes(),
        "each task should accumulate only its own data chunks"
    );
    assert_eq!(bytes_b, body_b.as_bytes());
}

#[tokio::test]
async fn test_download_exceeding_size_cap_fails_with_too_large() {
    let config = Config {
        max_response_size: Some(16),
        ..Default::default()
    };
    let manager = create_test_manager_with_config(config);

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("X".repeat(1024)))
        .mount(&mock_server)
        .await;

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    manager
        .download(request_for(&mock_server, "/large"), on_success, on_failure)
        .await;

    let error = outcome.recv().await.unwrap().unwrap_err();
    assert_eq!(error, FetchError::TooLarge);

    assert_eq!(manager.active_count().await, 0);
}

#[tokio::test]
async fn test_download_transport_error_fails_with_description() {
    let manager = create_test_manager();

    // Nothing listens on this port; the connection attempt fails at the
    // transport level.
    let url = url::Url::parse("http://127.0.0.1:1/unreachable").unwrap();
    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    manager
        .download(FetchRequest::new(url), on_success, on_failure)
        .await;

    let error = outcome.recv().await.unwrap().unwrap_err();
    assert!(
        matches!(error, FetchError::Other(_)),
        "transport failures should surface as Other with a description, got {error:?}"
    );

    assert_eq!(manager.active_count().await, 0);
}

#[tokio::test]
async fn test_download_sends_request_headers() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(wiremock::matchers::header("X-Requested-With", "page-merge"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
        .mount(&mock_server)
        .await;

    let request = request_for(&mock_server, "/page").header(
        reqwest::header::HeaderName::from_static("x-requested-with"),
        reqwest::header::HeaderValue::from_static("page-merge"),
    );

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    manager.download(request, on_success, on_failure).await;

    let bytes = outcome.recv().await.unwrap().unwrap();
    assert_eq!(bytes, SAMPLE_PAGE.as_bytes());
}

#[tokio::test]
async fn test_active_tasks_snapshots_in_flight_transfers() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SAMPLE_PAGE)
                .set_delay(std::time::Duration::from_secs(30)),
        )
        .mount(&mock_server)
        .await;

    let (on_success, on_failure, mut outcome) = outcome_callbacks();
    let id = manager
        .download(request_for(&mock_server, "/slow"), on_success, on_failure)
        .await
        .unwrap();

    let snapshot = manager.active_tasks().await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, id);
    assert!(snapshot[0].url.ends_with("/slow"));

    manager.cancel_all().await;
    outcome.recv().await.unwrap().unwrap_err();
}

#[tokio::test]
async fn test_task_ids_are_monotonic() {
    let manager = create_test_manager();

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
        .mount(&mock_server)
        .await;

    let (success_a, failure_a, mut outcome_a) = outcome_callbacks();
    let (success_b, failure_b, mut outcome_b) = outcome_callbacks();

    let first = manager
        .download(request_for(&mock_server, "/page"), success_a, failure_a)
        .await
        .unwrap();
    let second = manager
        .download(request_for(&mock_server, "/page"), success_b, failure_b)
        .await
        .unwrap();

    assert!(
        second > first,
        "ids double as insertion order, so they must increase"
    );

    outcome_a.recv().await.unwrap().unwrap();
    outcome_b.recv().await.unwrap().unwrap();
}
