//! Mock payment gateway for development and tests.
//!
//! A configurable in-process provider. Supports:
//! - Deterministic payment creation (no network)
//! - Scripted status poll results
//! - Error injection
//! - Genuine webhook signing, so the verify-before-trust path is
//!   exercised end to end with real HMAC arithmetic
//!
//! The webhook scheme is HMAC-SHA256 over the raw body, hex-encoded, in
//! the `x-mock-signature` header.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::ExposeSecret;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::MockProviderConfig;
use crate::domain::payment::money::Currency;
use crate::domain::payment::request::PaymentMethod;
use crate::domain::payment::{
    Money, PaymentRequest, PaymentStatus, ProviderId, WebhookNotification,
};
use crate::ports::{
    CreatedPayment, GatewayError, PaymentGateway, ProcessingFee, ProviderCapabilities,
};

type HmacSha256 = Hmac<Sha256>;

/// Mock payment gateway.
///
/// Cheap to clone; clones share state, so a test can keep a handle for
/// scripting while the orchestrator owns another.
#[derive(Clone)]
pub struct MockAdapter {
    config: MockProviderConfig,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Scripted status poll results by payment id.
    statuses: HashMap<String, (String, Option<PaymentStatus>)>,

    /// Error to return from the next create call.
    next_create_error: Option<GatewayError>,

    /// References seen by create, in order.
    created: Vec<String>,

    /// Monotonic counter for payment ids.
    next_id: u64,
}

impl MockAdapter {
    pub fn new(config: MockProviderConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Scripting
    // ══════════════════════════════════════════════════════════════

    /// Script the result of the next status poll for a payment.
    pub fn set_status(
        &self,
        payment_id: impl Into<String>,
        native_status: impl Into<String>,
        status: Option<PaymentStatus>,
    ) {
        self.inner
            .lock()
            .unwrap()
            .statuses
            .insert(payment_id.into(), (native_status.into(), status));
    }

    /// Fail the next create call with the given error.
    pub fn fail_next_create(&self, error: GatewayError) {
        self.inner.lock().unwrap().next_create_error = Some(error);
    }

    /// References passed to create, in call order.
    pub fn created_references(&self) -> Vec<String> {
        self.inner.lock().unwrap().created.clone()
    }

    /// Sign a webhook body the way this adapter expects.
    ///
    /// Returns the value for the `x-mock-signature` header.
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
                .expect("HMAC accepts any key length");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl PaymentGateway for MockAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Mock
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            provider: ProviderId::Mock,
            currencies: vec![Currency::Zar, Currency::Usd, Currency::Eur, Currency::Gbp],
            methods: vec![PaymentMethod::Card, PaymentMethod::Eft, PaymentMethod::QrCode],
            min_amount: dec!(0.01),
            max_amount: dec!(100_000_000.00),
            fee: ProcessingFee {
                rate: Decimal::ZERO,
                fixed: Decimal::ZERO,
            },
            handshake_ack: "OK",
        }
    }

    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(error) = state.next_create_error.take() {
            return Err(error);
        }
        state.next_id += 1;
        let payment_id = format!("mock_{}", state.next_id);
        state.created.push(request.reference.clone());
        Ok(CreatedPayment {
            payment_url: format!("https://mock.invalid/checkout/{}", payment_id),
            payment_id,
            status: PaymentStatus::Pending,
        })
    }

    async fn get_status(&self, payment_id: &str) -> Result<WebhookNotification, GatewayError> {
        let state = self.inner.lock().unwrap();
        let (native_status, status) = state
            .statuses
            .get(payment_id)
            .cloned()
            .ok_or(GatewayError::NotFound)?;
        Ok(WebhookNotification {
            external_payment_id: payment_id.to_string(),
            reference: None,
            status,
            native_status,
            amount: None,
            event_id: None,
            raw: serde_json::json!({}),
        })
    }

    fn verify_signature(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        _headers: &http::HeaderMap,
    ) -> bool {
        let Some(signature) = signature else {
            return false;
        };
        let expected = self.sign(raw_body);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    fn parse_payload(&self, raw_body: &[u8]) -> Result<WebhookNotification, GatewayError> {
        #[derive(serde::Deserialize)]
        struct MockEvent {
            payment_id: String,
            status: String,
            #[serde(default)]
            reference: Option<String>,
            #[serde(default)]
            amount: Option<Money>,
            #[serde(default)]
            event_id: Option<String>,
        }

        let raw: serde_json::Value = serde_json::from_slice(raw_body)
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;
        let event: MockEvent = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;

        Ok(WebhookNotification {
            external_payment_id: event.payment_id,
            reference: event.reference,
            status: PaymentStatus::from_str(&event.status).ok(),
            native_status: event.status,
            amount: event.amount,
            event_id: event.event_id,
            raw,
        })
    }
}
