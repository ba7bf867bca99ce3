//! End-to-end payment lifecycle tests.
//!
//! Drives the payment manager through creation, webhook delivery, and
//! status polling against the mock gateway and the in-memory store, the
//! same wiring the HTTP layer sits on.

use std::sync::Arc;

use http::HeaderMap;
use rust_decimal_macros::dec;

use paybridge::adapters::memory::InMemoryPaymentStore;
use paybridge::adapters::mock::MockAdapter;
use paybridge::adapters::registry::ProviderGateway;
use paybridge::application::{PaymentManager, WebhookDecision};
use paybridge::config::MockProviderConfig;
use paybridge::domain::payment::{
    Currency, CustomerDetails, LineItem, Money, PaymentRequest, PaymentStatus, ProviderId,
    RequestMetadata,
};
use paybridge::ports::PaymentStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn harness() -> (PaymentManager, MockAdapter, Arc<InMemoryPaymentStore>) {
    let mock = MockAdapter::new(MockProviderConfig {
        enabled: true,
        ..Default::default()
    });
    let store = Arc::new(InMemoryPaymentStore::new());
    let manager = PaymentManager::new(
        vec![ProviderGateway::Mock(mock.clone())],
        store.clone(),
        Some("https://pay.example.com".to_string()),
    );
    (manager, mock, store)
}

fn request(reference: &str, amount: Money) -> PaymentRequest {
    PaymentRequest {
        amount,
        customer: CustomerDetails {
            id: "cust-1".to_string(),
            email: "thandi@example.com".to_string(),
            name: "Thandi M".to_string(),
            phone: None,
            national_id: None,
            address: None,
        },
        items: Vec::<LineItem>::new(),
        metadata: RequestMetadata {
            order_id: "order-42".to_string(),
            customer_id: "cust-1".to_string(),
            session_id: "sess-1".to_string(),
            source: "test".to_string(),
            user_agent: None,
            ip_address: None,
        },
        return_url: String::new(),
        cancel_url: String::new(),
        notify_url: String::new(),
        description: "Order order-42".to_string(),
        reference: reference.to_string(),
        expires_at: None,
        allowed_methods: None,
    }
}

fn zar(value: rust_decimal::Decimal) -> Money {
    Money::new(value, Currency::Zar).unwrap()
}

fn signed_webhook(mock: &MockAdapter, body: &serde_json::Value) -> (Vec<u8>, HeaderMap) {
    let bytes = body.to_string().into_bytes();
    let mut headers = HeaderMap::new();
    headers.insert("x-mock-signature", mock.sign(&bytes).parse().unwrap());
    (bytes, headers)
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn payment_settles_through_webhook_delivery() {
    let (manager, mock, _) = harness();

    let response = manager
        .create_payment(request("ref-1", zar(dec!(250.00))), None)
        .await;
    assert!(response.success);
    let payment_id = response.payment_id.unwrap();

    let (body, headers) = signed_webhook(
        &mock,
        &serde_json::json!({
            "payment_id": payment_id,
            "status": "completed",
            "amount": {"value": "250.00", "currency": "ZAR"},
            "event_id": "evt_1"
        }),
    );
    let decision = manager
        .process_webhook(ProviderId::Mock, &body, &headers)
        .await
        .unwrap();
    assert!(decision.is_acknowledged());

    let record = manager
        .get_payment_status(ProviderId::Mock, &payment_id)
        .await
        .unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.history.len(), 1);
    assert_eq!(record.history[0].event_id.as_deref(), Some("evt_1"));
}

#[tokio::test]
async fn fractional_cents_are_normalized_before_the_provider_sees_them() {
    let (manager, mock, _) = harness();

    let response = manager
        .create_payment(request("ref-1", zar(dec!(149.995))), None)
        .await;
    assert!(response.success);
    assert_eq!(response.amount.unwrap().value(), dec!(150.00));
    let payment_id = response.payment_id.unwrap();

    // A webhook reporting the normalized amount matches the record.
    let (body, headers) = signed_webhook(
        &mock,
        &serde_json::json!({
            "payment_id": payment_id,
            "status": "completed",
            "amount": {"value": "150.00", "currency": "ZAR"}
        }),
    );
    assert!(manager
        .process_webhook(ProviderId::Mock, &body, &headers)
        .await
        .unwrap()
        .is_acknowledged());
}

#[tokio::test]
async fn out_of_order_delivery_never_regresses_the_status() {
    let (manager, mock, store) = harness();
    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    let payment_id = response.payment_id.unwrap();

    let (completed, completed_headers) = signed_webhook(
        &mock,
        &serde_json::json!({"payment_id": payment_id, "status": "completed"}),
    );
    let (processing, processing_headers) = signed_webhook(
        &mock,
        &serde_json::json!({"payment_id": payment_id, "status": "processing"}),
    );

    // The settlement arrives first; the delayed intermediate state after.
    assert!(manager
        .process_webhook(ProviderId::Mock, &completed, &completed_headers)
        .await
        .unwrap()
        .is_acknowledged());
    assert!(manager
        .process_webhook(ProviderId::Mock, &processing, &processing_headers)
        .await
        .unwrap()
        .is_acknowledged());

    let record = store.get(ProviderId::Mock, &payment_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.history.len(), 1);
}

#[tokio::test]
async fn concurrent_duplicate_deliveries_settle_exactly_once() {
    let (manager, mock, store) = harness();
    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    let payment_id = response.payment_id.unwrap();

    let (body, headers) = signed_webhook(
        &mock,
        &serde_json::json!({
            "payment_id": payment_id,
            "status": "completed",
            "event_id": "evt_1"
        }),
    );

    let (a, b) = tokio::join!(
        manager.process_webhook(ProviderId::Mock, &body, &headers),
        manager.process_webhook(ProviderId::Mock, &body, &headers),
    );
    assert!(a.unwrap().is_acknowledged() && b.unwrap().is_acknowledged());

    let record = store.get(ProviderId::Mock, &payment_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.history.len(), 1);
}

#[tokio::test]
async fn refund_follows_settlement() {
    let (manager, mock, store) = harness();
    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    let payment_id = response.payment_id.unwrap();

    for (status, event) in [("completed", "evt_1"), ("refunded", "evt_2")] {
        let (body, headers) = signed_webhook(
            &mock,
            &serde_json::json!({"payment_id": payment_id, "status": status, "event_id": event}),
        );
        assert!(manager
            .process_webhook(ProviderId::Mock, &body, &headers)
            .await
            .unwrap()
            .is_acknowledged());
    }

    let record = store.get(ProviderId::Mock, &payment_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Refunded);
    assert_eq!(record.history.len(), 2);
}

#[tokio::test]
async fn status_poll_settles_a_payment_without_webhooks() {
    let (manager, mock, _) = harness();
    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    let payment_id = response.payment_id.unwrap();

    mock.set_status(&payment_id, "completed", Some(PaymentStatus::Completed));

    let record = manager
        .get_payment_status(ProviderId::Mock, &payment_id)
        .await
        .unwrap();
    assert_eq!(record.status, PaymentStatus::Completed);
    assert_eq!(record.history[0].native_status, "completed");
}

#[tokio::test]
async fn tampered_webhook_leaves_the_record_untouched() {
    let (manager, mock, store) = harness();
    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    let payment_id = response.payment_id.unwrap();

    let (body, _) = signed_webhook(
        &mock,
        &serde_json::json!({"payment_id": payment_id, "status": "completed"}),
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-mock-signature",
        mock.sign(b"different body").parse().unwrap(),
    );

    let decision = manager
        .process_webhook(ProviderId::Mock, &body, &headers)
        .await
        .unwrap();
    assert!(matches!(
        decision,
        WebhookDecision::Refused(ref e) if e.code() == "SIGNATURE_VERIFICATION_FAILED"
    ));

    let record = store.get(ProviderId::Mock, &payment_id).await.unwrap();
    assert_eq!(record.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn reference_reuse_is_refused_after_a_successful_create() {
    let (manager, _, _) = harness();
    assert!(manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await
        .success);

    let response = manager
        .create_payment(request("ref-1", zar(dec!(100.00))), None)
        .await;
    assert!(!response.success);
    assert_eq!(response.error.unwrap().code, "VALIDATION_ERROR");
}
