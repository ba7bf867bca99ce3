//! State machine trait for status enums.
//!
//! Gives a status enum validated transition methods once it declares its
//! legal edges.

use super::errors::PaymentError;

/// Trait for status enums that represent state machines.
///
/// Implementors define the legal direct edges and get validated transition
/// methods for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if a direct transition from self to target is legal.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all legal direct targets from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs a transition with validation, returning an error if illegal.
    fn transition_to(&self, target: Self) -> Result<Self, PaymentError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(PaymentError::validation(
                "status",
                format!("cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if the current state is terminal (no legal outgoing edges).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
