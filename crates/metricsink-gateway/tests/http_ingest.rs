//! Ingestion endpoint tests, driven through the router without a socket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use metricsink_gateway::app_state::AppState;
use metricsink_gateway::router::build_router;
use metricsink_gateway::transport::http::MetricSink;

#[derive(Default)]
struct RecordingSink {
    names: Mutex<Vec<String>>,
}

impl MetricSink for RecordingSink {
    fn add_metric(&self, name: &str) {
        self.names.lock().unwrap().push(name.to_string());
    }
}

async fn send(sink: &Arc<RecordingSink>, method: Method, uri: &str) -> StatusCode {
    let app = build_router(AppState::new(sink.clone()));
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(req).await.unwrap().status()
}

#[tokio::test]
async fn path_becomes_metric_name() {
    let sink = Arc::new(RecordingSink::default());

    assert_eq!(send(&sink, Method::GET, "/cpu.load").await, StatusCode::OK);
    assert_eq!(send(&sink, Method::POST, "/mem.used").await, StatusCode::OK);

    assert_eq!(*sink.names.lock().unwrap(), vec!["cpu.load", "mem.used"]);
}

#[tokio::test]
async fn only_the_leading_slash_is_stripped() {
    let sink = Arc::new(RecordingSink::default());

    assert_eq!(send(&sink, Method::PUT, "/app/requests").await, StatusCode::OK);
    assert_eq!(send(&sink, Method::GET, "/disk%20io").await, StatusCode::OK);

    assert_eq!(*sink.names.lock().unwrap(), vec!["app/requests", "disk io"]);
}

#[tokio::test]
async fn empty_name_is_rejected() {
    let sink = Arc::new(RecordingSink::default());

    assert_eq!(send(&sink, Method::GET, "/").await, StatusCode::BAD_REQUEST);
    assert_eq!(send(&sink, Method::POST, "/").await, StatusCode::BAD_REQUEST);

    assert!(sink.names.lock().unwrap().is_empty());
}
