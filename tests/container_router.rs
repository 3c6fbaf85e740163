// End-to-end tests against `Container::router()`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use karen_core::container::Container;
use karen_core::device::{Listener, Speaker};
use karen_core::network::PeerClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_container() -> Arc<Container> {
    Container::new(
        "127.0.0.1:0".parse().unwrap(),
        "http://127.0.0.1:1".to_string(),
        PeerClient::new().unwrap(),
        None,
    )
}

async fn post(router: axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn status_devices_lists_added_devices() {
    let container = test_container();
    container
        .add_device(Arc::new(Listener::new()), "mic-1", false, false, Some("mic".into()))
        .await
        .unwrap();

    let (status, body) = post(container.router(), "/status/devices", json!({"command": "get-all-current"})).await;
    assert_eq!(status, StatusCode::OK);
    let devices = body["data"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["type"], "listener");
}

#[tokio::test]
async fn say_without_speaker_reports_capability_error() {
    let container = test_container();
    let (status, body) = post(container.router(), "/control", json!({"command": "SAY", "data": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn say_with_speaker_succeeds() {
    let container = test_container();
    container
        .add_device(Arc::new(Speaker::new()), "spk-1", false, false, None)
        .await
        .unwrap();

    let (status, body) = post(container.router(), "/control", json!({"command": "SAY", "data": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
}

#[tokio::test]
async fn kill_acknowledges_before_stop_completes() {
    let container = test_container();
    let (status, body) = post(container.router(), "/control", json!({"command": "KILL"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
}
