//! Normalized create-payment result.
//!
//! Adapter-level failures are folded into this shape at the manager
//! boundary rather than propagated, so every caller sees one contract
//! regardless of which processor handled the request.

use serde::{Deserialize, Serialize};

use super::errors::PaymentError;
use super::money::Money;
use super::provider::ProviderId;
use super::status::PaymentStatus;

/// Uniform result of a create-payment operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub success: bool,

    /// Provider-issued payment identifier; present on success.
    pub payment_id: Option<String>,

    pub provider: Option<ProviderId>,

    pub status: Option<PaymentStatus>,

    /// Where to send the customer to complete payment.
    pub redirect_url: Option<String>,

    pub amount: Option<Money>,

    pub error: Option<ResponseError>,
}

/// Error detail carried inside a failed [`PaymentResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    /// Stable SCREAMING_SNAKE code for clients.
    pub code: String,

    pub message: String,

    /// Whether retrying (with a fresh reference) could succeed.
    pub retryable: bool,
}

impl PaymentResponse {
    /// Successful creation.
    pub fn succeeded(
        provider: ProviderId,
        payment_id: impl Into<String>,
        redirect_url: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            success: true,
            payment_id: Some(payment_id.into()),
            provider: Some(provider),
            status: Some(PaymentStatus::Pending),
            redirect_url: Some(redirect_url.into()),
            amount: Some(amount),
            error: None,
        }
    }

    /// Failed creation, normalized from the error taxonomy.
    pub fn failed(provider: Option<ProviderId>, error: &PaymentError) -> Self {
        Self {
            success: false,
            payment_id: None,
            provider,
            status: None,
            redirect_url: None,
            amount: None,
            error: Some(ResponseError {
                code: error.code().to_string(),
                message: error.message(),
                retryable: error.is_retryable(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::money::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn success_response_carries_pending_status() {
        let amount = Money::new(dec!(100), Currency::Zar).unwrap();
        let response = PaymentResponse::succeeded(
            ProviderId::Yoco,
            "ch_123",
            "https://pay.example.com/ch_123",
            amount,
        );
        assert!(response.success);
        assert_eq!(response.status, Some(PaymentStatus::Pending));
        assert_eq!(response.payment_id.as_deref(), Some("ch_123"));
        assert!(response.error.is_none());
    }

    #[test]
    fn failure_response_carries_stable_code() {
        let err = PaymentError::provider_unavailable("no provider supports GBP");
        let response = PaymentResponse::failed(None, &err);
        assert!(!response.success);
        let detail = response.error.unwrap();
        assert_eq!(detail.code, "PROVIDER_UNAVAILABLE");
        assert!(detail.retryable);
    }

    #[test]
    fn failure_preserves_selected_provider() {
        let err = PaymentError::provider_api("payfast", "HTTP 502", true);
        let response = PaymentResponse::failed(Some(ProviderId::Payfast), &err);
        assert_eq!(response.provider, Some(ProviderId::Payfast));
    }
}
