//! In-memory payment store.
//!
//! Backs development and tests. A single `RwLock` serializes writers, so
//! the transition rule's atomicity holds under concurrent webhook
//! delivery without any further coordination.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::payment::{PaymentRecord, PaymentStatus, ProviderId, TransitionOutcome};
use crate::ports::{PaymentStore, StoreError};

/// In-memory implementation of [`PaymentStore`].
#[derive(Clone, Default)]
pub struct InMemoryPaymentStore {
    records: Arc<RwLock<HashMap<(ProviderId, String), PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records (for tests).
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.values().any(|r| r.reference == record.reference) {
            return Err(StoreError::DuplicateReference(record.reference));
        }
        records.insert((record.provider, record.payment_id.clone()), record);
        Ok(())
    }

    async fn get(
        &self,
        provider: ProviderId,
        payment_id: &str,
    ) -> Result<PaymentRecord, StoreError> {
        self.records
            .read()
            .await
            .get(&(provider, payment_id.to_string()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_reference(
        &self,
        provider: ProviderId,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.provider == provider && r.reference == reference)
            .cloned())
    }

    async fn apply_transition(
        &self,
        provider: ProviderId,
        payment_id: &str,
        target: PaymentStatus,
        native_status: &str,
        event_id: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Result<TransitionOutcome, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&(provider, payment_id.to_string()))
            .ok_or(StoreError::NotFound)?;
        Ok(record.apply_transition(target, native_status, event_id, payload))
    }
}
