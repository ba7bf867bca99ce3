//! Application layer - Payment orchestration.
//!
//! This layer coordinates domain operations across ports: provider
//! selection and payment creation in `manager`, the webhook processing
//! pipeline in `webhook`.

pub mod manager;
pub mod webhook;

pub use manager::PaymentManager;
pub use webhook::{WebhookDecision, WebhookProcessor};
