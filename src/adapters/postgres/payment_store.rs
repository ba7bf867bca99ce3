//! PostgreSQL implementation of the payment store.
//!
//! Transitions use a compare-and-set on `(status, status_rank)`: the
//! outcome is planned in Rust from a fresh read, then applied with an
//! UPDATE conditioned on the status it was planned against. A zero-row
//! update means a concurrent writer won; the plan is redone against the
//! new state. Ranks strictly increase on apply, so the loop terminates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::payment::money::Currency;
use crate::domain::payment::{
    plan_transition, Money, PaymentRecord, PaymentStatus, ProviderId, StatusTransition,
    TransitionOutcome,
};
use crate::ports::{PaymentStore, StoreError};

/// PostgreSQL implementation of the [`PaymentStore`] port.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    provider: String,
    payment_id: String,
    order_id: String,
    reference: String,
    amount: Decimal,
    currency: String,
    status: String,
    last_payload: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct TransitionRow {
    from_status: String,
    to_status: String,
    native_status: String,
    event_id: Option<String>,
    occurred_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_record(self, history: Vec<StatusTransition>) -> Result<PaymentRecord, StoreError> {
        Ok(PaymentRecord {
            provider: parse_provider(&self.provider)?,
            payment_id: self.payment_id,
            order_id: self.order_id,
            reference: self.reference,
            amount: Money::new(self.amount, parse_currency(&self.currency)?)
                .map_err(|e| StoreError::Backend(format!("stored amount invalid: {}", e)))?,
            status: parse_status(&self.status)?,
            history,
            last_payload: self.last_payload,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<TransitionRow> for StatusTransition {
    type Error = StoreError;

    fn try_from(row: TransitionRow) -> Result<Self, Self::Error> {
        Ok(StatusTransition {
            from: parse_status(&row.from_status)?,
            to: parse_status(&row.to_status)?,
            native_status: row.native_status,
            event_id: row.event_id,
            occurred_at: row.occurred_at,
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentStatus, StoreError> {
    s.parse()
        .map_err(|_| StoreError::Backend(format!("invalid status value: {}", s)))
}

fn parse_provider(s: &str) -> Result<ProviderId, StoreError> {
    s.parse()
        .map_err(|_| StoreError::Backend(format!("invalid provider value: {}", s)))
}

fn parse_currency(s: &str) -> Result<Currency, StoreError> {
    s.parse()
        .map_err(|_| StoreError::Backend(format!("invalid currency value: {}", s)))
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl PostgresPaymentStore {
    async fn fetch_status(
        &self,
        provider: ProviderId,
        payment_id: &str,
    ) -> Result<PaymentStatus, StoreError> {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM payments WHERE provider = $1 AND payment_id = $2")
                .bind(provider.as_str())
                .bind(payment_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(backend)?;
        match status {
            Some((status,)) => parse_status(&status),
            None => Err(StoreError::NotFound),
        }
    }

    /// Apply one planned transition; `Ok(false)` means a concurrent writer
    /// changed the row first.
    async fn try_apply(
        &self,
        provider: ProviderId,
        payment_id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
        native_status: &str,
        event_id: Option<&str>,
        payload: Option<&serde_json::Value>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let updated = sqlx::query(
            r#"
            UPDATE payments
            SET status = $1,
                status_rank = $2,
                last_payload = COALESCE($3, last_payload),
                updated_at = NOW()
            WHERE provider = $4
              AND payment_id = $5
              AND status = $6
              AND status_rank < $2
            "#,
        )
        .bind(to.as_str())
        .bind(i16::from(to.rank()))
        .bind(payload)
        .bind(provider.as_str())
        .bind(payment_id)
        .bind(from.as_str())
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if updated.rows_affected() == 0 {
            tx.rollback().await.map_err(backend)?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO payment_transitions (
                provider, payment_id, from_status, to_status,
                native_status, event_id, occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(provider.as_str())
        .bind(payment_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(native_status)
        .bind(event_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(true)
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                provider, payment_id, order_id, reference, amount, currency,
                status, status_rank, last_payload, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.provider.as_str())
        .bind(&record.payment_id)
        .bind(&record.order_id)
        .bind(&record.reference)
        .bind(record.amount.value())
        .bind(record.amount.currency().code())
        .bind(record.status.as_str())
        .bind(i16::from(record.status.rank()))
        .bind(&record.last_payload)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let is_unique_violation = e
                    .as_database_error()
                    .and_then(|d| d.code())
                    .map(|code| code == "23505")
                    .unwrap_or(false);
                if is_unique_violation {
                    Err(StoreError::DuplicateReference(record.reference))
                } else {
                    Err(backend(e))
                }
            }
        }
    }

    async fn get(
        &self,
        provider: ProviderId,
        payment_id: &str,
    ) -> Result<PaymentRecord, StoreError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT provider, payment_id, order_id, reference, amount, currency,
                   status, last_payload, created_at, updated_at
            FROM payments
            WHERE provider = $1 AND payment_id = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let row = row.ok_or(StoreError::NotFound)?;

        let transitions: Vec<TransitionRow> = sqlx::query_as(
            r#"
            SELECT from_status, to_status, native_status, event_id, occurred_at
            FROM payment_transitions
            WHERE provider = $1 AND payment_id = $2
            ORDER BY id
            "#,
        )
        .bind(provider.as_str())
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let history = transitions
            .into_iter()
            .map(StatusTransition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        row.into_record(history)
    }

    async fn find_by_reference(
        &self,
        provider: ProviderId,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let payment_id: Option<(String,)> = sqlx::query_as(
            "SELECT payment_id FROM payments WHERE provider = $1 AND reference = $2",
        )
        .bind(provider.as_str())
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match payment_id {
            Some((payment_id,)) => Ok(Some(self.get(provider, &payment_id).await?)),
            None => Ok(None),
        }
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
        // Ranks strictly increase on every applied transition, so each
        // retry observes a higher rank and the loop is bounded.
        loop {
            let current = self.fetch_status(provider, payment_id).await?;
            let outcome = plan_transition(current, target);
            let TransitionOutcome::Applied { from, to } = outcome else {
                return Ok(outcome);
            };

            let applied = self
                .try_apply(
                    provider,
                    payment_id,
                    from,
                    to,
                    native_status,
                    event_id,
                    payload.as_ref(),
                )
                .await?;
            if applied {
                return Ok(outcome);
            }
            // Lost the race; replan against the winner's state.
        }
    }
}
