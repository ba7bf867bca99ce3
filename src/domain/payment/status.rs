//! Canonical payment status and the transition rules applied to it.
//!
//! Every provider's native vocabulary is mapped into this closed set inside
//! its adapter; no native status leaks past the adapter boundary. Statuses
//! carry a monotonic rank used by the compare-and-set transition rule, so
//! concurrent and out-of-order webhook deliveries converge deterministically.

use serde::{Deserialize, Serialize};

use super::errors::PaymentError;
use super::state_machine::StateMachine;

/// Canonical, provider-independent payment status.
///
/// Legal direct edges:
/// `Pending → Processing`, `Processing → {Completed, Failed, Cancelled,
/// Expired}`, `Completed → Refunded`. Providers may skip intermediates (a
/// processor can report completion while the record is still pending), which
/// the apply rule in [`plan_transition`] accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment created, customer not yet redirected or still deciding.
    Pending,

    /// The provider is actively processing the payment.
    Processing,

    /// Funds captured successfully.
    Completed,

    /// The provider reported a failure (declined, errored).
    Failed,

    /// The customer abandoned or cancelled the payment.
    Cancelled,

    /// The payment window lapsed before completion.
    Expired,

    /// A completed payment was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Monotonic rank used by the compare-and-set apply rule.
    ///
    /// The four settlement states share a rank because none is reachable
    /// from another; only `Completed → Refunded` climbs further.
    pub fn rank(&self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::Processing => 1,
            PaymentStatus::Completed
            | PaymentStatus::Failed
            | PaymentStatus::Cancelled
            | PaymentStatus::Expired => 2,
            PaymentStatus::Refunded => 3,
        }
    }

    /// Whether `target` is reachable from self through legal direct edges,
    /// possibly skipping intermediates.
    pub fn can_reach(&self, target: PaymentStatus) -> bool {
        if *self == target {
            return false;
        }
        self.valid_transitions()
            .iter()
            .any(|next| *next == target || next.can_reach(target))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Cancelled)
                | (Processing, Expired)
                | (Completed, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Processing],
            Processing => vec![Completed, Failed, Cancelled, Expired],
            Completed => vec![Refunded],
            Failed | Cancelled | Expired | Refunded => vec![],
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "processing" => Ok(PaymentStatus::Processing),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            "expired" => Ok(PaymentStatus::Expired),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(PaymentError::validation(
                "status",
                format!("unknown payment status '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The decision made for one requested status transition.
///
/// Dropped transitions are logged by the caller, never surfaced as errors:
/// at-least-once webhook delivery makes duplicates and reordering normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The transition was legal and has been applied.
    Applied {
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// The record already carries the target status; redelivery no-op.
    Duplicate,

    /// The target ranks below the current status; an out-of-order or
    /// replayed earlier notification, dropped.
    Stale,

    /// The target shares the current status's rank but disagrees with it
    /// (e.g. `Failed` arriving after `Completed`); a provider conflict,
    /// dropped.
    Conflict,

    /// The target ranks higher but is not reachable through legal edges
    /// (e.g. `Refunded` after `Failed`); dropped.
    Illegal,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied { .. })
    }

    /// True when the transition was recognized and dropped.
    pub fn was_dropped(&self) -> bool {
        matches!(
            self,
            TransitionOutcome::Stale | TransitionOutcome::Conflict | TransitionOutcome::Illegal
        )
    }
}

/// Classify a requested transition against the current status.
///
/// The apply rule: a target is accepted when it is reachable from the
/// current status through legal edges AND carries a strictly greater rank.
/// Everything else is classified for logging and dropped.
pub fn plan_transition(current: PaymentStatus, target: PaymentStatus) -> TransitionOutcome {
    if target == current {
        return TransitionOutcome::Duplicate;
    }
    if target.rank() < current.rank() {
        return TransitionOutcome::Stale;
    }
    if target.rank() == current.rank() {
        return TransitionOutcome::Conflict;
    }
    if current.can_reach(target) {
        TransitionOutcome::Applied {
            from: current,
            to: target,
        }
    } else {
        TransitionOutcome::Illegal
    }
}
