//! Payment request model and validation.
//!
//! A validated `PaymentRequest` is the single input to every adapter's
//! create operation. Validation runs once at the manager boundary; adapters
//! may assume the invariants hold.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::errors::PaymentError;
use super::money::Money;

/// Payment methods an adapter can offer at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Eft,
    QrCode,
}

impl std::str::FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "eft" => Ok(PaymentMethod::Eft),
            "qr_code" | "qrcode" => Ok(PaymentMethod::QrCode),
            other => Err(PaymentError::validation(
                "allowed_methods",
                format!("unknown payment method '{}'", other),
            )),
        }
    }
}

/// The customer a payment is attributed to.
///
/// Identity comes from the fronting gateway; these fields only describe the
/// payer to the provider (pre-filling checkout, fraud screening).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
}

/// One order line attached to the payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub sku: Option<String>,
}

/// Correlation metadata carried with the payment for audit and support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub order_id: String,
    pub customer_id: String,
    pub session_id: String,
    pub source: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A request to create a payment at a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub customer: CustomerDetails,
    pub items: Vec<LineItem>,
    pub metadata: RequestMetadata,

    /// Where the provider sends the customer after completing payment.
    pub return_url: String,

    /// Where the provider sends the customer after abandoning payment.
    pub cancel_url: String,

    /// Where the provider delivers webhook notifications.
    pub notify_url: String,

    pub description: String,

    /// Caller-supplied idempotency boundary: unique per creation attempt.
    /// A retried create after a network failure must carry a fresh value.
    pub reference: String,

    pub expires_at: Option<DateTime<Utc>>,

    /// Restrict checkout to these methods; `None` means any the provider
    /// offers.
    pub allowed_methods: Option<Vec<PaymentMethod>>,
}

impl PaymentRequest {
    /// Validate the request ahead of any provider call.
    ///
    /// Amount positivity and normalization are enforced by [`Money`] at
    /// construction; this checks everything else.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.reference.trim().is_empty() {
            return Err(PaymentError::validation(
                "reference",
                "reference must not be empty",
            ));
        }
        if self.metadata.order_id.trim().is_empty() {
            return Err(PaymentError::validation(
                "order_id",
                "order id must not be empty",
            ));
        }
        if self.customer.id.trim().is_empty() {
            return Err(PaymentError::validation(
                "customer.id",
                "customer id must not be empty",
            ));
        }
        if self.customer.name.trim().is_empty() {
            return Err(PaymentError::validation(
                "customer.name",
                "customer name must not be empty",
            ));
        }
        if !self.customer.email.contains('@') {
            return Err(PaymentError::validation(
                "customer.email",
                "customer email is malformed",
            ));
        }

        for (field, url) in [
            ("return_url", &self.return_url),
            ("cancel_url", &self.cancel_url),
            ("notify_url", &self.notify_url),
        ] {
            let parsed = url::Url::parse(url)
                .map_err(|_| PaymentError::validation(field, "must be a valid URL"))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(PaymentError::validation(field, "must be an http(s) URL"));
            }
        }

        for item in &self.items {
            if item.quantity == 0 {
                return Err(PaymentError::validation(
                    "items.quantity",
                    format!("item '{}' has zero quantity", item.id),
                ));
            }
            let expected = (item.unit_price * Decimal::from(item.quantity))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let actual = item
                .total_price
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            if expected != actual {
                return Err(PaymentError::validation(
                    "items.total_price",
                    format!(
                        "item '{}': quantity x unit_price is {} but total_price is {}",
                        item.id, expected, actual
                    ),
                ));
            }
        }

        if let Some(expires_at) = self.expires_at {
            if expires_at <= Utc::now() {
                return Err(PaymentError::validation(
                    "expires_at",
                    "expiry must be in the future",
                ));
            }
        }

        if let Some(methods) = &self.allowed_methods {
            if methods.is_empty() {
                return Err(PaymentError::validation(
                    "allowed_methods",
                    "must name at least one method when present",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::money::Currency;
    use rust_decimal_macros::dec;

    fn valid_request() -> PaymentRequest {
        PaymentRequest {
            amount: Money::new(dec!(100.00), Currency::Zar).unwrap(),
            customer: CustomerDetails {
                id: "cust-1".to_string(),
                email: "thandi@example.com".to_string(),
                name: "Thandi M".to_string(),
                phone: Some("+27821234567".to_string()),
                national_id: None,
                address: None,
            },
            items: vec![LineItem {
                id: "item-1".to_string(),
                name: "Widget".to_string(),
                quantity: 2,
                unit_price: dec!(50.00),
                total_price: dec!(100.00),
                sku: Some("W-1".to_string()),
            }],
            metadata: RequestMetadata {
                order_id: "order-42".to_string(),
                customer_id: "cust-1".to_string(),
                session_id: "sess-1".to_string(),
                source: "web".to_string(),
                user_agent: None,
                ip_address: None,
            },
            return_url: "https://shop.example.com/payment/return".to_string(),
            cancel_url: "https://shop.example.com/payment/cancel".to_string(),
            notify_url: "https://shop.example.com/api/webhooks?provider=mock".to_string(),
            description: "Order order-42".to_string(),
            reference: "order-42-attempt-1".to_string(),
            expires_at: None,
            allowed_methods: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn rejects_empty_reference() {
        let mut req = valid_request();
        req.reference = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_malformed_email() {
        let mut req = valid_request();
        req.customer.email = "not-an-email".to_string();
        let err = req.validate().unwrap_err();
        assert!(err.message().contains("customer.email"));
    }

    #[test]
    fn rejects_non_http_url() {
        let mut req = valid_request();
        req.notify_url = "ftp://shop.example.com/notify".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_unparseable_url() {
        let mut req = valid_request();
        req.return_url = "not a url".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_inconsistent_line_totals() {
        let mut req = valid_request();
        req.items[0].total_price = dec!(99.00);
        let err = req.validate().unwrap_err();
        assert!(err.message().contains("total_price"));
    }

    #[test]
    fn rejects_zero_quantity() {
        let mut req = valid_request();
        req.items[0].quantity = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn line_totals_compared_after_normalization() {
        let mut req = valid_request();
        req.items[0].quantity = 3;
        req.items[0].unit_price = dec!(33.335);
        req.items[0].total_price = dec!(100.01);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_past_expiry() {
        let mut req = valid_request();
        req.expires_at = Some(Utc::now() - chrono::Duration::minutes(1));
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_empty_allowed_methods() {
        let mut req = valid_request();
        req.allowed_methods = Some(vec![]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn payment_method_parsing() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("EFT".parse::<PaymentMethod>().unwrap(), PaymentMethod::Eft);
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }
}
