//! PostgreSQL adapters - durable payment record persistence.
//!
//! - `PostgresPaymentStore` - sqlx-backed [`crate::ports::PaymentStore`]
//!   with rank-guarded conditional transition updates

mod payment_store;

pub use payment_store::PostgresPaymentStore;
