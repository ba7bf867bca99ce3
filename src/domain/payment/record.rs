//! The canonical payment record.
//!
//! Orchestrator-owned and provider-independent: created on successful
//! payment creation, mutated only through the monotonic transition rule
//! (webhook pipeline or an explicit status poll), never deleted. History is
//! append-only so out-of-order webhook delivery can be audited afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::provider::ProviderId;
use super::status::{plan_transition, PaymentStatus, TransitionOutcome};

/// One applied status transition, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,

    /// The provider's native status string that caused the transition.
    pub native_status: String,

    /// Provider event id, when the notification carried one.
    pub event_id: Option<String>,

    pub occurred_at: DateTime<Utc>,
}

/// Canonical record of one payment's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Provider-issued payment identifier.
    pub payment_id: String,

    pub provider: ProviderId,

    pub order_id: String,

    /// The idempotency reference the payment was created under.
    pub reference: String,

    pub amount: Money,

    pub status: PaymentStatus,

    /// Applied transitions, oldest first. Dropped transitions append
    /// nothing.
    pub history: Vec<StatusTransition>,

    /// The most recent raw provider payload, for support and audit.
    pub last_payload: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// A freshly created payment, pending customer action.
    pub fn new(
        payment_id: impl Into<String>,
        provider: ProviderId,
        order_id: impl Into<String>,
        reference: impl Into<String>,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            payment_id: payment_id.into(),
            provider,
            order_id: order_id.into(),
            reference: reference.into(),
            amount,
            status: PaymentStatus::Pending,
            history: Vec::new(),
            last_payload: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status transition under the monotonic rule.
    ///
    /// Applied transitions update the status, append one history entry, and
    /// replace the stored payload. Dropped transitions leave the record
    /// untouched; the caller logs the outcome.
    pub fn apply_transition(
        &mut self,
        target: PaymentStatus,
        native_status: &str,
        event_id: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> TransitionOutcome {
        let outcome = plan_transition(self.status, target);
        if let TransitionOutcome::Applied { from, to } = outcome {
            let now = Utc::now();
            self.status = to;
            self.updated_at = now;
            if let Some(payload) = payload {
                self.last_payload = Some(payload);
            }
            self.history.push(StatusTransition {
                from,
                to,
                native_status: native_status.to_string(),
                event_id: event_id.map(str::to_string),
                occurred_at: now,
            });
        }
        outcome
    }
}
