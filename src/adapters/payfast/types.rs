//! PayFast wire types.

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::payment::PaymentStatus;

/// Response from the onsite checkout endpoint.
#[derive(Debug, Deserialize)]
pub struct OnsiteResponse {
    /// Checkout identifier; doubles as the payment id and the path segment
    /// of the hosted payment page.
    pub uuid: String,
}

/// Response from the merchant API transaction query.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub data: QueryData,
}

#[derive(Debug, Deserialize)]
pub struct QueryData {
    pub response: QueryTransaction,
}

#[derive(Debug, Deserialize)]
pub struct QueryTransaction {
    pub pf_payment_id: Option<String>,
    pub m_payment_id: Option<String>,
    pub status: String,
    pub amount_gross: Option<String>,
}

/// A parsed ITN (Instant Transaction Notification) body.
///
/// ITN bodies are form-urlencoded; this is the decoded field map with the
/// handful of fields the orchestrator reads pulled out.
#[derive(Debug)]
pub struct ItnPayload {
    pub m_payment_id: Option<String>,
    pub pf_payment_id: Option<String>,
    pub payment_status: String,
    pub amount_gross: Option<String>,
    pub fields: HashMap<String, String>,
}

impl ItnPayload {
    /// Build from decoded form pairs.
    ///
    /// Returns `None` when the body carries no `payment_status`, which no
    /// genuine ITN omits.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Option<Self> {
        let fields: HashMap<String, String> = pairs.into_iter().collect();
        let payment_status = fields.get("payment_status")?.clone();
        Some(Self {
            m_payment_id: fields.get("m_payment_id").cloned(),
            pf_payment_id: fields.get("pf_payment_id").cloned(),
            amount_gross: fields.get("amount_gross").cloned(),
            payment_status,
            fields,
        })
    }
}

/// Map PayFast's status vocabulary onto the canonical set.
///
/// `PENDING` means PayFast accepted the payment and is awaiting settlement,
/// so it maps to processing. Unknown strings map to `None` and are
/// acknowledged without a transition.
pub fn map_status(native: &str) -> Option<PaymentStatus> {
    match native.to_uppercase().as_str() {
        "COMPLETE" => Some(PaymentStatus::Completed),
        "FAILED" => Some(PaymentStatus::Failed),
        "CANCELLED" => Some(PaymentStatus::Cancelled),
        "PENDING" => Some(PaymentStatus::Processing),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_statuses() {
        assert_eq!(map_status("COMPLETE"), Some(PaymentStatus::Completed));
        assert_eq!(map_status("FAILED"), Some(PaymentStatus::Failed));
        assert_eq!(map_status("CANCELLED"), Some(PaymentStatus::Cancelled));
        assert_eq!(map_status("PENDING"), Some(PaymentStatus::Processing));
    }

    #[test]
    fn mapping_is_case_insensitive() {
        assert_eq!(map_status("complete"), Some(PaymentStatus::Completed));
    }

    #[test]
    fn unknown_status_maps_to_none() {
        assert_eq!(map_status("CHARGEBACK_PENDING"), None);
    }

    #[test]
    fn itn_payload_requires_payment_status() {
        let pairs = vec![("m_payment_id".to_string(), "order-1".to_string())];
        assert!(ItnPayload::from_pairs(pairs).is_none());

        let pairs = vec![
            ("m_payment_id".to_string(), "order-1".to_string()),
            ("payment_status".to_string(), "COMPLETE".to_string()),
        ];
        let payload = ItnPayload::from_pairs(pairs).unwrap();
        assert_eq!(payload.payment_status, "COMPLETE");
        assert_eq!(payload.m_payment_id.as_deref(), Some("order-1"));
    }
}
