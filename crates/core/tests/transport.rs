mod common;

use std::{sync::Arc, time::Duration};

use cd_metrics_core::{
    DispatchError, DispatchOutcome, FetchTransport, HostTransport, LegacyTransport, Metrics,
    Transport,
};
use common::{CollectingSink, serve_once, serve_once_blocking};

#[tokio::test]
async fn fetch_posts_a_form_body() {
    let (url, captured) = serve_once(200).await;
    let transport = FetchTransport::new().unwrap();
    let body = "v=1&t=event&tid=UA-X&cid=123".to_string();

    let status = transport.send(&url, body.clone()).await.unwrap();
    assert_eq!(status, 200);

    let request = captured.await.unwrap();
    assert!(request.head.starts_with("POST /batch HTTP/1.1"));
    assert_eq!(
        request.header("content-type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.header("content-length"), Some(body.len().to_string()));
    assert_eq!(request.body, body);
}

#[tokio::test]
async fn fetch_returns_error_statuses_as_values() {
    let (url, _captured) = serve_once(500).await;
    let transport = FetchTransport::new().unwrap();

    assert_eq!(transport.send(&url, "v=1".into()).await, Ok(500));
}

#[tokio::test]
async fn metrics_over_http_reports_server_errors() {
    let (url, captured) = serve_once(500).await;
    let sink = CollectingSink::default();
    let metrics = Metrics::builder("123")
        .property_id("UA-X")
        .endpoint(url)
        .logger(Arc::new(sink.clone()))
        .build();

    let outcome = metrics.record_event("test", "click", "btn", 42, None).await;

    assert_eq!(outcome, DispatchOutcome::Failed(DispatchError::Status(500)));
    let request = captured.await.unwrap();
    assert!(request.body.starts_with("v=1&t=event&tid=UA-X&cid=123&ec=test"));
    assert!(request.body.ends_with("&cd6=123"));
    assert_eq!(sink.terminal_lines().len(), 1);
}

#[test]
fn legacy_posts_without_a_runtime() {
    let (url, captured) = serve_once_blocking(Some(204));
    let transport = LegacyTransport::default();
    let body = "v=1&t=event&ec=a%20b".to_string();

    let status = futures::executor::block_on(transport.send(&url, body.clone())).unwrap();
    assert_eq!(status, 204);

    let request = captured.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(request.body, body);
    assert_eq!(
        request.header("content-type").as_deref(),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn legacy_times_out_on_a_silent_server() {
    let (url, _captured) = serve_once_blocking(None);
    let transport = LegacyTransport::new(Duration::from_millis(200));

    let result = futures::executor::block_on(transport.send(&url, "v=1".into()));
    assert_eq!(result, Err(DispatchError::TimedOut));
}

#[test]
fn host_transport_falls_back_to_legacy_outside_a_runtime() {
    let (url, captured) = serve_once_blocking(Some(200));
    let sink = CollectingSink::default();
    let metrics = Metrics::builder("123")
        .endpoint(url)
        .transport(Arc::new(HostTransport::detect()))
        .logger(Arc::new(sink.clone()))
        .build();

    let outcome = futures::executor::block_on(metrics.record_floating_point_event(
        "test", "measure", "pi", 3.14, None,
    ));

    assert_eq!(outcome, DispatchOutcome::Succeeded { status: 200 });
    let request = captured.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(request.body.ends_with("&cd7=3.14"));
    assert!(
        sink.lines()
            .iter()
            .any(|line| line.message.contains("Sending request via legacy"))
    );
}
