//! Intent Webhook Integration Tests
//!
//! Drives the axum router in-process.

use assistant_desk::intent::{self, DEFAULT_REPLY};
use assistant_desk::webhook::router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_webhook(body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_known_intent() {
    let payload = json!({
        "responseId": "abc",
        "queryResult": {
            "queryText": "I forgot my password",
            "intent": {"name": "projects/x/agent/intents/1", "displayName": "Password Reset"}
        }
    });

    let (status, body) = post_webhook(&payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fulfillmentText"], intent::route(Some("Password Reset")));
}

#[tokio::test]
async fn test_unknown_intent_gets_default() {
    let payload = json!({"queryResult": {"intent": {"displayName": "Unknown Intent"}}});
    let (status, body) = post_webhook(&payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"fulfillmentText": DEFAULT_REPLY}));
}

#[tokio::test]
async fn test_malformed_payload_gets_default() {
    for payload in ["", "{", "[]", r#"{"queryResult": null}"#] {
        let (status, body) = post_webhook(payload).await;
        assert_eq!(status, StatusCode::OK, "payload {:?}", payload);
        assert_eq!(body["fulfillmentText"], DEFAULT_REPLY);
    }
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
