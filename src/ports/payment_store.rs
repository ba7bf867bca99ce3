//! Payment store port.
//!
//! Persistence contract for canonical payment records. The store owns the
//! concurrency story for status transitions: `apply_transition` must be
//! atomic under concurrent delivery of the same or competing webhooks, so
//! the monotonic rule holds even when two notifications race.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::payment::{
    PaymentError, PaymentRecord, PaymentStatus, ProviderId, TransitionOutcome,
};

/// Errors from the payment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under that provider and payment id.
    #[error("payment not found")]
    NotFound,

    /// A record with this reference already exists.
    #[error("reference already used: {0}")]
    DuplicateReference(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for PaymentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PaymentError::not_found("no such payment"),
            StoreError::DuplicateReference(reference) => PaymentError::validation(
                "reference",
                format!("reference '{}' was already used", reference),
            ),
            StoreError::Backend(message) => PaymentError::internal(message),
        }
    }
}

/// Port for canonical payment record persistence.
///
/// Records are keyed by `(provider, payment_id)`; references are unique
/// across the store.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a freshly created record.
    ///
    /// # Errors
    ///
    /// `DuplicateReference` when the record's reference was already used.
    async fn insert(&self, record: PaymentRecord) -> Result<(), StoreError>;

    /// Fetch a record by provider and payment id.
    async fn get(&self, provider: ProviderId, payment_id: &str)
        -> Result<PaymentRecord, StoreError>;

    /// Look a record up by its merchant reference.
    ///
    /// Webhook schemes that report under their own payment id (rather
    /// than the one issued at creation) resolve the record this way.
    async fn find_by_reference(
        &self,
        provider: ProviderId,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, StoreError>;

    /// Apply a status transition under the monotonic rule, atomically.
    ///
    /// Concurrent calls for the same record must serialize such that
    /// exactly one of two identical notifications applies; the loser is
    /// classified against the state the winner left behind.
    async fn apply_transition(
        &self,
        provider: ProviderId,
        payment_id: &str,
        target: PaymentStatus,
        native_status: &str,
        event_id: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Result<TransitionOutcome, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn PaymentStore) {}
    }

    #[test]
    fn store_errors_fold_into_the_taxonomy() {
        let err: PaymentError = StoreError::NotFound.into();
        assert_eq!(err.code(), "NOT_FOUND");

        let err: PaymentError = StoreError::DuplicateReference("order-1".into()).into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.message().contains("order-1"));

        let err: PaymentError = StoreError::Backend("pool exhausted".into()).into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.is_retryable());
    }
}
