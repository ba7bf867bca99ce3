//! Integration tests for the payments HTTP API.
//!
//! Exercises the full router (middleware included) with in-process
//! requests: caller identity enforcement, the uniform create response,
//! status queries, and the webhook acknowledgement protocol.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use paybridge::adapters::http::{api_router, PaymentsAppState};
use paybridge::adapters::memory::InMemoryPaymentStore;
use paybridge::adapters::mock::MockAdapter;
use paybridge::adapters::registry::ProviderGateway;
use paybridge::application::PaymentManager;
use paybridge::config::MockProviderConfig;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn test_app() -> (Router, MockAdapter) {
    let mock = MockAdapter::new(MockProviderConfig {
        enabled: true,
        ..Default::default()
    });
    let manager = Arc::new(PaymentManager::new(
        vec![ProviderGateway::Mock(mock.clone())],
        Arc::new(InMemoryPaymentStore::new()),
        Some("https://pay.example.com".to_string()),
    ));
    let app = api_router(
        PaymentsAppState { manager },
        &[],
        Duration::from_secs(30),
    );
    (app, mock)
}

fn create_body(reference: &str) -> Value {
    json!({
        "amount": {"value": "149.995", "currency": "ZAR"},
        "customer": {"email": "thandi@example.com", "name": "Thandi M"},
        "order_id": "order-42",
        "reference": reference
    })
}

async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    customer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(customer_id) = customer {
        builder = builder.header("X-Customer-Id", customer_id);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_payment(app: &Router, reference: &str) -> String {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/payments",
        Some("cust-1"),
        Some(create_body(reference)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["payment_id"].as_str().unwrap().to_string()
}

// =============================================================================
// Payment Endpoint Tests
// =============================================================================

#[tokio::test]
async fn create_requires_caller_identity() {
    let (app, _) = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/payments",
        None,
        Some(create_body("ref-1")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn create_answers_with_the_uniform_response() {
    let (app, _) = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/payments",
        Some("cust-1"),
        Some(create_body("ref-1")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["provider"], "mock");
    assert_eq!(body["status"], "pending");
    // 149.995 was normalized half-up on the way in.
    assert_eq!(body["amount"]["value"], "150.00");
    assert!(body["redirect_url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn create_with_unknown_provider_override_is_a_uniform_failure() {
    let (app, _) = test_app();
    let mut body = create_body("ref-1");
    body["provider"] = json!("paypal");

    let (status, body) = send_json(&app, "POST", "/api/payments", Some("cust-1"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn validation_failure_is_folded_not_rejected() {
    let (app, _) = test_app();
    let mut body = create_body("ref-1");
    body["customer"]["email"] = json!("not-an-email");

    let (status, body) = send_json(&app, "POST", "/api/payments", Some("cust-1"), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["retryable"], false);
}

#[tokio::test]
async fn status_returns_the_record() {
    let (app, _) = test_app();
    let payment_id = create_payment(&app, "ref-1").await;

    let (status, body) = send_json(
        &app,
        "GET",
        &format!("/api/payments/status?provider=mock&payment_id={}", payment_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_id"], payment_id.as_str());
    assert_eq!(body["status"], "pending");
    assert_eq!(body["reference"], "ref-1");
}

#[tokio::test]
async fn status_of_unknown_payment_is_404() {
    let (app, _) = test_app();
    let (status, body) = send_json(
        &app,
        "GET",
        "/api/payments/status?provider=mock&payment_id=mock_404",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn status_with_unknown_provider_is_400() {
    let (app, _) = test_app();
    let (status, body) = send_json(
        &app,
        "GET",
        "/api/payments/status?provider=paypal&payment_id=x",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn provider_listing_reports_capabilities() {
    let (app, _) = test_app();
    let (status, body) = send_json(&app, "GET", "/api/payments/providers", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let providers = body["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0]["provider"], "mock");
    assert!(providers[0]["currencies"]
        .as_array()
        .unwrap()
        .contains(&json!("ZAR")));
}

// =============================================================================
// Webhook Endpoint Tests
// =============================================================================

#[tokio::test]
async fn webhook_settles_the_payment_and_acks_with_the_expected_body() {
    let (app, mock) = test_app();
    let payment_id = create_payment(&app, "ref-1").await;

    let event = json!({"payment_id": payment_id, "status": "completed"}).to_string();
    let signature = mock.sign(event.as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks?provider=mock")
        .header("x-mock-signature", signature)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(event))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // The provider expects this exact acknowledgement body.
    assert_eq!(&bytes[..], b"OK");

    let (_, body) = send_json(
        &app,
        "GET",
        &format!("/api/payments/status?provider=mock&payment_id={}", payment_id),
        None,
        None,
    )
    .await;
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn unsigned_webhook_is_refused_with_400() {
    let (app, _) = test_app();
    let payment_id = create_payment(&app, "ref-1").await;

    let event = json!({"payment_id": payment_id, "status": "completed"}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks?provider=mock")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(event))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    // The refusal carries the taxonomy code, not an ad hoc one.
    assert_eq!(body["code"], "SIGNATURE_VERIFICATION_FAILED");

    // The record did not move.
    let (_, body) = send_json(
        &app,
        "GET",
        &format!("/api/payments/status?provider=mock&payment_id={}", payment_id),
        None,
        None,
    )
    .await;
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn webhook_with_empty_signature_is_refused() {
    let (app, _) = test_app();
    let payment_id = create_payment(&app, "ref-1").await;

    let event = json!({"payment_id": payment_id, "status": "completed"}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/webhooks?provider=mock")
        .header("x-mock-signature", "")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(event))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "SIGNATURE_VERIFICATION_FAILED");
}

#[tokio::test]
async fn webhook_without_provider_is_400() {
    let (app, _) = test_app();
    let (status, body) = send_json(&app, "POST", "/api/webhooks", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn webhook_for_unknown_provider_is_400() {
    let (app, _) = test_app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/webhooks?provider=paypal",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_PROVIDER");
}

#[tokio::test]
async fn handshake_probe_answers_with_the_ack_body() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/api/webhooks?provider=mock")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn health_probe_answers() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
