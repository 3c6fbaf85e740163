// End-to-end tests against `Brain::router()` over real HTTP semantics
// (request/response bodies, status codes), rather than calling handlers
// directly as the unit tests in src/brain/dispatch.rs do.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use karen_core::brain::Brain;
use karen_core::network::PeerClient;
use karen_core::skills::KeywordIntentParser;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower::ServiceExt;

fn test_brain() -> std::sync::Arc<Brain> {
    Brain::new(
        "127.0.0.1:0".parse().unwrap(),
        PeerClient::new().unwrap(),
        Box::new(KeywordIntentParser::new()),
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
async fn status_is_online_without_auth() {
    let brain = test_brain();
    let router = brain.router();

    let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], false);
}

#[tokio::test]
async fn register_then_status_devices_reflects_it() {
    let brain = test_brain();

    let (status, body) = post(
        brain.router(),
        "/register",
        json!({
            "port": 8081,
            "useHttp": true,
            "url": "http://container-1.internal:8081",
            "devices": {"listener": {"count": 1, "names": ["mic"]}},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);

    let (status, body) = post(brain.router(), "/status/devices", json!({"command": "get-all-current"})).await;
    assert_eq!(status, StatusCode::OK);
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["active"], true);
}

#[tokio::test]
async fn control_with_missing_command_is_rejected() {
    let brain = test_brain();
    let (status, body) = post(brain.router(), "/control", json!({})).await;
    assert_eq!(status, StatusCode::OK, "protocol errors still return 200 per the envelope contract");
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn data_audio_input_is_acknowledged_immediately() {
    let brain = test_brain();
    let (status, body) = post(brain.router(), "/data", json!({"type": "AUDIO_INPUT", "data": "hello there"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], false);
    assert_eq!(body["message"], "Data collected successfully.");
}

#[tokio::test]
async fn bearer_auth_rejects_missing_token() {
    let brain = Brain::new(
        "127.0.0.1:0".parse().unwrap(),
        PeerClient::new().unwrap(),
        Box::new(KeywordIntentParser::new()),
        Some("secret-token".to_string()),
    );

    let request = Request::builder().uri("/status").body(Body::empty()).unwrap();
    let response = brain.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_auth_accepts_correct_token() {
    let brain = Brain::new(
        "127.0.0.1:0".parse().unwrap(),
        PeerClient::new().unwrap(),
        Box::new(KeywordIntentParser::new()),
        Some("secret-token".to_string()),
    );

    let request = Request::builder()
        .uri("/status")
        .header("authorization", "Bearer secret-token")
        .body(Body::empty())
        .unwrap();
    let response = brain.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_prefers_self_reported_url_over_peer_address() {
    // Exercises the full `into_make_service_with_connect_info` path by
    // binding a real listener rather than using `oneshot` (which has no
    // peer address to report). The registering Container claims a
    // different host than the one it's dialing in from (as it would
    // behind NAT or a reverse proxy) — the Brain must trust that claim,
    // not the TCP peer address (spec.md §9).
    let brain = test_brain();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let router = brain.router().into_make_service_with_connect_info::<SocketAddr>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            })
            .await
            .unwrap();
    });

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/register"))
        .json(&json!({"port": 9100, "useHttp": true, "url": "http://container-7.internal:9100", "devices": {}}))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let records = brain.core.registry.list_all().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, "http://container-7.internal:9100");

    server.abort();
}
