//! Normalized webhook event.
//!
//! What an adapter's `parse_payload` produces from a verified raw body.
//! The native status string is preserved for audit; the canonical mapping
//! is the adapter's own table and `None` marks an event that carries no
//! payment transition (an unknown or non-payment event type, acknowledged
//! without mutation).

use serde::{Deserialize, Serialize};

use super::money::Money;
use super::status::PaymentStatus;

/// A provider notification, normalized past the adapter boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotification {
    /// The provider's identifier for the payment.
    pub external_payment_id: String,

    /// The merchant reference echoed back by the provider, when carried.
    /// Used to locate the record when the provider reports under a
    /// different id than the one issued at creation.
    pub reference: Option<String>,

    /// The provider's own status vocabulary, verbatim.
    pub native_status: String,

    /// Canonical mapping of `native_status`; `None` when the event carries
    /// no payment transition.
    pub status: Option<PaymentStatus>,

    /// The amount the provider reports, for cross-checking against the
    /// stored record.
    pub amount: Option<Money>,

    /// Provider event id, when the scheme issues one; recorded in the
    /// transition history for audit.
    pub event_id: Option<String>,

    /// The payload as structured data, stored on the record for audit.
    pub raw: serde_json::Value,
}
