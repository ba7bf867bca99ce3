//! Request and response DTOs for the payments API.
//!
//! DTOs keep the wire contract decoupled from domain types: incoming
//! shapes are converted into a [`PaymentRequest`] at the handler
//! boundary, outgoing shapes are built from domain values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::payment::{
    CustomerDetails, LineItem, Money, PaymentMethod, PaymentRecord, PaymentRequest,
    PaymentStatus, ProviderId, RequestMetadata, StatusTransition,
};
use crate::ports::ProviderCapabilities;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payments request body.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentBody {
    /// Exact decimal amount; validated and normalized on deserialization.
    pub amount: Money,

    pub customer: CustomerBody,

    #[serde(default)]
    pub items: Vec<LineItemBody>,

    pub order_id: String,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub return_url: Option<String>,

    #[serde(default)]
    pub cancel_url: Option<String>,

    #[serde(default)]
    pub notify_url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Idempotency reference; must be fresh per creation attempt.
    pub reference: String,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub allowed_methods: Option<Vec<PaymentMethod>>,

    /// Explicit provider override; omit to let priority selection decide.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerBody {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemBody {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
}

impl CreatePaymentBody {
    /// Assemble the domain request. The customer identity comes from the
    /// authenticated caller, not the body.
    pub fn into_request(self, customer_id: String, user_agent: Option<String>) -> PaymentRequest {
        PaymentRequest {
            amount: self.amount,
            customer: CustomerDetails {
                id: customer_id.clone(),
                email: self.customer.email,
                name: self.customer.name,
                phone: self.customer.phone,
                national_id: self.customer.national_id,
                address: self.customer.address,
            },
            items: self
                .items
                .into_iter()
                .map(|item| LineItem {
                    id: item.id,
                    name: item.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                    sku: item.sku,
                })
                .collect(),
            metadata: RequestMetadata {
                order_id: self.order_id.clone(),
                customer_id,
                session_id: self.session_id.unwrap_or_default(),
                source: self.source.unwrap_or_else(|| "api".to_string()),
                user_agent,
                ip_address: None,
            },
            return_url: self.return_url.unwrap_or_default(),
            cancel_url: self.cancel_url.unwrap_or_default(),
            notify_url: self.notify_url.unwrap_or_default(),
            description: self
                .description
                .unwrap_or_else(|| format!("Order {}", self.order_id)),
            reference: self.reference,
            expires_at: self.expires_at,
            allowed_methods: self.allowed_methods,
        }
    }
}

/// Query parameters for GET /api/payments/status.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub provider: String,
    pub payment_id: String,
}

/// Query parameters for webhook endpoints.
#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    #[serde(default)]
    pub provider: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payments/status response body.
#[derive(Debug, Serialize)]
pub struct PaymentRecordResponse {
    pub payment_id: String,
    pub provider: ProviderId,
    pub order_id: String,
    pub reference: String,
    pub amount: Money,
    pub status: PaymentStatus,
    pub history: Vec<TransitionResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub native_status: String,
    pub event_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl From<PaymentRecord> for PaymentRecordResponse {
    fn from(record: PaymentRecord) -> Self {
        Self {
            payment_id: record.payment_id,
            provider: record.provider,
            order_id: record.order_id,
            reference: record.reference,
            amount: record.amount,
            status: record.status,
            history: record.history.into_iter().map(TransitionResponse::from).collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<StatusTransition> for TransitionResponse {
    fn from(transition: StatusTransition) -> Self {
        Self {
            from: transition.from,
            to: transition.to,
            native_status: transition.native_status,
            event_id: transition.event_id,
            occurred_at: transition.occurred_at,
        }
    }
}

/// One entry in the GET /api/payments/providers listing.
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub provider: ProviderId,
    pub currencies: Vec<String>,
    pub methods: Vec<PaymentMethod>,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fee_rate: Decimal,
    pub fee_fixed: Decimal,
}

impl From<ProviderCapabilities> for ProviderResponse {
    fn from(capabilities: ProviderCapabilities) -> Self {
        Self {
            provider: capabilities.provider,
            currencies: capabilities
                .currencies
                .iter()
                .map(|c| c.code().to_string())
                .collect(),
            methods: capabilities.methods,
            min_amount: capabilities.min_amount,
            max_amount: capabilities.max_amount,
            fee_rate: capabilities.fee.rate,
            fee_fixed: capabilities.fee.fixed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderResponse>,
}

/// Uniform error body for non-payment-response failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_body_fills_domain_request() {
        let body: CreatePaymentBody = serde_json::from_value(serde_json::json!({
            "amount": {"value": "149.995", "currency": "ZAR"},
            "customer": {"email": "thandi@example.com", "name": "Thandi M"},
            "order_id": "order-42",
            "reference": "order-42-attempt-1"
        }))
        .unwrap();

        let request = body.into_request("cust-1".to_string(), Some("test-agent".to_string()));
        // Deserialization normalized the amount half-up to two places.
        assert_eq!(request.amount.value(), dec!(150.00));
        assert_eq!(request.customer.id, "cust-1");
        assert_eq!(request.metadata.customer_id, "cust-1");
        assert_eq!(request.metadata.source, "api");
        assert_eq!(request.description, "Order order-42");
        assert!(request.return_url.is_empty());
    }

    #[test]
    fn create_body_rejects_invalid_amount() {
        let result: Result<CreatePaymentBody, _> = serde_json::from_value(serde_json::json!({
            "amount": {"value": "-5.00", "currency": "ZAR"},
            "customer": {"email": "a@b.c", "name": "A"},
            "order_id": "order-1",
            "reference": "ref-1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn record_response_carries_history() {
        let mut record = PaymentRecord::new(
            "mock_1",
            ProviderId::Mock,
            "order-42",
            "ref-1",
            Money::new(dec!(100.00), crate::domain::payment::Currency::Zar).unwrap(),
        );
        record.apply_transition(PaymentStatus::Completed, "completed", Some("evt_1"), None);

        let response = PaymentRecordResponse::from(record);
        assert_eq!(response.status, PaymentStatus::Completed);
        assert_eq!(response.history.len(), 1);
        assert_eq!(response.history[0].event_id.as_deref(), Some("evt_1"));
    }
}
