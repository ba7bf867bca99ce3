//! Payment gateway port for external payment processors.
//!
//! One contract per provider integration: create a payment, poll its
//! status, verify and parse webhook notifications. Implementations own
//! their provider's wire formats and signature schemes; nothing
//! provider-specific crosses this boundary.
//!
//! # Design
//!
//! - **Verify before trust**: `parse_payload` is only called on bodies
//!   that already passed `verify_signature`
//! - **Normalized output**: adapters map native status vocabularies to
//!   the canonical set before anything reaches the orchestrator

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::payment::money::Currency;
use crate::domain::payment::request::PaymentMethod;
use crate::domain::payment::{
    Money, PaymentError, PaymentRequest, PaymentStatus, ProviderId, WebhookNotification,
};

/// Result of a successful create operation at a provider.
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    /// Provider-issued payment identifier.
    pub payment_id: String,

    /// Where to send the customer to complete payment.
    pub payment_url: String,

    pub status: PaymentStatus,
}

/// A provider's fee structure, for routing decisions.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingFee {
    /// Percentage of the amount, as a fraction (0.029 for 2.9%).
    pub rate: Decimal,

    /// Fixed charge per transaction, in major units.
    pub fixed: Decimal,
}

impl ProcessingFee {
    /// Estimated fee for an amount, in major units.
    pub fn estimate(&self, amount: &Money) -> Decimal {
        amount.value() * self.rate + self.fixed
    }
}

/// What a provider supports, declared by its adapter.
#[derive(Debug, Clone)]
pub struct ProviderCapabilities {
    pub provider: ProviderId,

    pub currencies: Vec<Currency>,

    pub methods: Vec<PaymentMethod>,

    /// Smallest amount the provider accepts, in major units.
    pub min_amount: Decimal,

    /// Largest amount the provider accepts, in major units.
    pub max_amount: Decimal,

    pub fee: ProcessingFee,

    /// Body to answer a provider's GET probe of the webhook endpoint with.
    pub handshake_ack: &'static str,
}

impl ProviderCapabilities {
    /// Whether this provider can take the request at all.
    ///
    /// Checks currency, amount bounds, and requested payment methods.
    pub fn covers(&self, request: &PaymentRequest) -> bool {
        if !self.currencies.contains(&request.amount.currency()) {
            return false;
        }
        let value = request.amount.value();
        if value < self.min_amount || value > self.max_amount {
            return false;
        }
        if let Some(methods) = &request.allowed_methods {
            if !methods.iter().any(|m| self.methods.contains(m)) {
                return false;
            }
        }
        true
    }
}

/// Errors from gateway operations, before the manager folds them into
/// the payment error taxonomy.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Could not reach the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with an error status.
    #[error("provider API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider does not know this payment.
    #[error("payment not found at provider")]
    NotFound,

    /// The provider answered 2xx but the body was not what its API
    /// documents.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    /// A verified webhook body failed to parse.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

impl GatewayError {
    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network(_) => true,
            GatewayError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Fold into the payment error taxonomy for the named provider.
    ///
    /// Provider message text stays inside `message()`; the stable code is
    /// what clients dispatch on.
    pub fn into_payment_error(self, provider: ProviderId) -> PaymentError {
        match self {
            GatewayError::NotFound => {
                PaymentError::not_found(format!("unknown to {}", provider.as_str()))
            }
            other => {
                let retryable = other.is_retryable();
                PaymentError::provider_api(provider.as_str(), other.to_string(), retryable)
            }
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // Status-carrying errors come from error_for_status; everything
        // else (connect, timeout, body) is a network failure.
        match err.status() {
            Some(status) => GatewayError::Api {
                status: status.as_u16(),
                message: "provider request failed".to_string(),
            },
            None => GatewayError::Network(err.to_string()),
        }
    }
}

/// Port for one payment provider integration.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Which provider this adapter fronts.
    fn provider_id(&self) -> ProviderId;

    /// What this provider supports.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Create a payment at the provider.
    async fn create_payment(&self, request: &PaymentRequest)
        -> Result<CreatedPayment, GatewayError>;

    /// Poll the provider for a payment's current status.
    ///
    /// Returns the same normalized shape as a webhook so both paths feed
    /// one transition rule.
    async fn get_status(&self, payment_id: &str) -> Result<WebhookNotification, GatewayError>;

    /// Verify a webhook's authenticity from the raw body.
    ///
    /// `signature` is the value of the provider's signature header when
    /// the scheme uses one; schemes that embed the signature in the body
    /// ignore it. Always fail-closed: any doubt is `false`.
    fn verify_signature(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        headers: &http::HeaderMap,
    ) -> bool;

    /// Parse a verified webhook body into a normalized notification.
    ///
    /// Only called after `verify_signature` returned `true`.
    fn parse_payload(&self, raw_body: &[u8]) -> Result<WebhookNotification, GatewayError>;
}
