//! Yoco gateway adapter.
//!
//! Creates hosted checkouts through the Checkout API and verifies webhook
//! deliveries with the rotating-secret HMAC scheme in [`super::webhook`].
//!
//! # Security
//!
//! - Bearer authentication with the secret API key
//! - `Idempotency-Key` on every create, so a retried request cannot
//!   double-charge
//! - Webhook signatures verified from the raw body before any parsing

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::ExposeSecret;

use crate::config::YocoConfig;
use crate::domain::payment::money::Currency;
use crate::domain::payment::request::PaymentMethod;
use crate::domain::payment::{
    Money, PaymentRequest, PaymentStatus, ProviderId, WebhookNotification,
};
use crate::ports::{
    CreatedPayment, GatewayError, PaymentGateway, ProcessingFee, ProviderCapabilities,
};

use super::types::{
    map_checkout_status, map_event_type, ApiError, CheckoutRequest, CheckoutResponse,
    WebhookEnvelope,
};
use super::webhook::YocoWebhookVerifier;

const API_URL: &str = "https://payments.yoco.com";

/// Yoco payment gateway adapter.
pub struct YocoAdapter {
    config: YocoConfig,
    http_client: reqwest::Client,
    base_url: String,
    /// `None` when the configured signing secret cannot be decoded; every
    /// verification then fails closed.
    verifier: Option<YocoWebhookVerifier>,
    create_timeout: Duration,
    status_timeout: Duration,
}

impl YocoAdapter {
    pub fn new(config: YocoConfig, create_timeout: Duration, status_timeout: Duration) -> Self {
        let verifier = YocoWebhookVerifier::new(config.webhook_secret.expose_secret());
        if verifier.is_none() {
            tracing::error!("Yoco webhook secret is not decodable; webhook deliveries will be rejected");
        }
        Self {
            config,
            http_client: reqwest::Client::new(),
            base_url: API_URL.to_string(),
            verifier,
            create_timeout,
            status_timeout,
        }
    }

    /// Point at a different endpoint (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn api_failure(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiError>().await {
            Ok(body) => body
                .display_message
                .or(body.error_code)
                .unwrap_or_else(|| "no error detail".to_string()),
            Err(_) => "no error detail".to_string(),
        };
        GatewayError::Api { status, message }
    }
}

#[async_trait]
impl PaymentGateway for YocoAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Yoco
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            provider: ProviderId::Yoco,
            currencies: vec![Currency::Zar],
            methods: vec![PaymentMethod::Card],
            min_amount: dec!(2.00),
            max_amount: dec!(500_000.00),
            fee: ProcessingFee {
                rate: dec!(0.0295),
                fixed: Decimal::ZERO,
            },
            handshake_ack: "OK",
        }
    }

    async fn create_payment(
        &self,
        request: &PaymentRequest,
    ) -> Result<CreatedPayment, GatewayError> {
        let mut metadata = HashMap::new();
        metadata.insert("reference".to_string(), request.reference.clone());
        metadata.insert("order_id".to_string(), request.metadata.order_id.clone());
        metadata.insert(
            "customer_id".to_string(),
            request.metadata.customer_id.clone(),
        );

        let body = CheckoutRequest {
            amount: request.amount.minor_units(),
            currency: request.amount.currency().code().to_string(),
            success_url: request.return_url.clone(),
            cancel_url: request.cancel_url.clone(),
            failure_url: request.cancel_url.clone(),
            external_id: Some(request.reference.clone()),
            metadata,
        };

        let response = self
            .http_client
            .post(format!("{}/api/checkouts", self.base_url))
            .timeout(self.create_timeout)
            .bearer_auth(self.config.secret_key.expose_secret())
            .header("Idempotency-Key", &request.reference)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Yoco checkout request rejected");
            return Err(Self::api_failure(response).await);
        }

        let checkout: CheckoutResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let redirect_url = checkout.redirect_url.ok_or_else(|| {
            GatewayError::InvalidResponse("checkout response carried no redirect URL".to_string())
        })?;

        Ok(CreatedPayment {
            payment_id: checkout.id,
            payment_url: redirect_url,
            status: PaymentStatus::Pending,
        })
    }

    async fn get_status(&self, payment_id: &str) -> Result<WebhookNotification, GatewayError> {
        let response = self
            .http_client
            .get(format!("{}/api/checkouts/{}", self.base_url, payment_id))
            .timeout(self.status_timeout)
            .bearer_auth(self.config.secret_key.expose_secret())
            .send()
            .await?;

        if response.status().as_u16() == 404 {
            return Err(GatewayError::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::api_failure(response).await);
        }

        let checkout: CheckoutResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let amount = match (checkout.amount, checkout.currency.as_deref()) {
            (Some(minor), Some(code)) => code
                .parse::<Currency>()
                .ok()
                .and_then(|currency| Money::new(Decimal::new(minor, 2), currency).ok()),
            _ => None,
        };

        Ok(WebhookNotification {
            external_payment_id: checkout.id,
            reference: None,
            status: map_checkout_status(&checkout.status),
            native_status: checkout.status,
            amount,
            event_id: None,
            raw: serde_json::json!({}),
        })
    }

    fn verify_signature(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        headers: &http::HeaderMap,
    ) -> bool {
        let Some(verifier) = &self.verifier else {
            return false;
        };
        let Some(signature) = signature else {
            return false;
        };
        let (Some(id), Some(timestamp)) = (
            headers.get("webhook-id").and_then(|v| v.to_str().ok()),
            headers.get("webhook-timestamp").and_then(|v| v.to_str().ok()),
        ) else {
            return false;
        };
        verifier.verify(raw_body, id, timestamp, signature)
    }

    fn parse_payload(&self, raw_body: &[u8]) -> Result<WebhookNotification, GatewayError> {
        let envelope: WebhookEnvelope = serde_json::from_slice(raw_body)
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;
        let raw: serde_json::Value = serde_json::from_slice(raw_body)
            .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;

        let amount = match (
            envelope.payload.amount,
            envelope.payload.currency.as_deref(),
        ) {
            (Some(minor), Some(code)) => code
                .parse::<Currency>()
                .ok()
                .and_then(|currency| Money::new(Decimal::new(minor, 2), currency).ok()),
            _ => None,
        };

        // Records are keyed by checkout id; the webhook reports its own
        // payment id, so prefer the checkout id echoed through metadata.
        let external_payment_id = envelope
            .payload
            .checkout_id()
            .unwrap_or_else(|| envelope.payload.id.clone());

        Ok(WebhookNotification {
            external_payment_id,
            reference: envelope.payload.reference(),
            status: map_event_type(&envelope.event_type),
            native_status: envelope.event_type,
            amount,
            event_id: Some(envelope.id),
            raw,
        })
    }
}
