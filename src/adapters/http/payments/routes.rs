//! Axum router configuration for payment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payment, get_payment_status, list_providers, receive_webhook, webhook_handshake,
    PaymentsAppState,
};

/// Create the payments API router.
///
/// # Routes
///
/// ## Payment Endpoints (require caller identity)
/// - `POST /` - Create a payment
///
/// ## Query Endpoints
/// - `GET /status` - Current payment state (refreshed from the provider)
/// - `GET /providers` - Configured providers and capabilities
pub fn payment_routes() -> Router<PaymentsAppState> {
    Router::new()
        .route("/", post(create_payment))
        .route("/status", get(get_payment_status))
        .route("/providers", get(list_providers))
}

/// Create the webhook router.
///
/// Separate from the payment routes because webhook deliveries carry no
/// caller identity; they authenticate by signature instead.
///
/// # Routes
/// - `POST /` - Receive a provider notification
/// - `GET /` - Endpoint validation handshake
pub fn webhook_routes() -> Router<PaymentsAppState> {
    Router::new().route("/", post(receive_webhook).get(webhook_handshake))
}

/// Create the complete payments module router, mounted under `/api`.
pub fn payments_router() -> Router<PaymentsAppState> {
    Router::new()
        .nest("/payments", payment_routes())
        .nest("/webhooks", webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::memory::InMemoryPaymentStore;
    use crate::adapters::mock::MockAdapter;
    use crate::adapters::registry::ProviderGateway;
    use crate::application::PaymentManager;
    use crate::config::MockProviderConfig;

    fn test_state() -> PaymentsAppState {
        let mock = MockAdapter::new(MockProviderConfig {
            enabled: true,
            ..Default::default()
        });
        PaymentsAppState {
            manager: Arc::new(PaymentManager::new(
                vec![ProviderGateway::Mock(mock)],
                Arc::new(InMemoryPaymentStore::new()),
                Some("https://pay.example.com".to_string()),
            )),
        }
    }

    #[test]
    fn payment_routes_creates_router() {
        let router = payment_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn webhook_routes_creates_router() {
        let router = webhook_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn payments_router_creates_combined_router() {
        let router = payments_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
