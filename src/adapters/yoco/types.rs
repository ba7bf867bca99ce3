//! Yoco wire types.
//!
//! The Checkout API speaks camelCase JSON with amounts in integer minor
//! units (cents).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::payment::PaymentStatus;

/// Request body for creating a checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Amount in minor units.
    pub amount: i64,

    /// ISO 4217 code.
    pub currency: String,

    pub success_url: String,
    pub cancel_url: String,
    pub failure_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    pub metadata: HashMap<String, String>,
}

/// A checkout as the API returns it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub id: String,
    pub redirect_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Error body the API returns on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub display_message: Option<String>,
}

/// Envelope of a webhook delivery.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub payload: WebhookPayload,
}

/// The payment object inside a webhook envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub id: String,

    #[serde(default)]
    pub status: Option<String>,

    /// Amount in minor units.
    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl WebhookPayload {
    /// The checkout this payment belongs to, when echoed in metadata.
    pub fn checkout_id(&self) -> Option<String> {
        self.metadata
            .get("checkoutId")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// The merchant reference supplied at creation, when echoed back.
    pub fn reference(&self) -> Option<String> {
        self.metadata
            .get("reference")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Map a checkout status onto the canonical set.
pub fn map_checkout_status(native: &str) -> Option<PaymentStatus> {
    match native {
        "created" => Some(PaymentStatus::Pending),
        "processing" => Some(PaymentStatus::Processing),
        "completed" | "succeeded" => Some(PaymentStatus::Completed),
        "failed" => Some(PaymentStatus::Failed),
        "cancelled" => Some(PaymentStatus::Cancelled),
        "expired" => Some(PaymentStatus::Expired),
        _ => None,
    }
}

/// Map a webhook event type onto the canonical set.
///
/// Unknown event types map to `None` and are acknowledged without a
/// transition, so new event families cannot break delivery.
pub fn map_event_type(event_type: &str) -> Option<PaymentStatus> {
    match event_type {
        "payment.succeeded" => Some(PaymentStatus::Completed),
        "payment.failed" => Some(PaymentStatus::Failed),
        "refund.succeeded" => Some(PaymentStatus::Refunded),
        _ => None,
    }
}
