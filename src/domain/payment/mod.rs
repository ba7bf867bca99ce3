//! Payment domain: data model, canonical status machine, error taxonomy.
//!
//! # Module Organization
//!
//! - `money` - Exact decimal amounts and the supported currency set
//! - `status` - Canonical status, ranks, and the transition apply rule
//! - `state_machine` - Validated-transition trait for status enums
//! - `provider` - Closed set of provider identities
//! - `request` / `response` - The uniform create-payment contract
//! - `record` - The persisted, provider-independent payment record
//! - `webhook` - Normalized provider notifications
//! - `errors` - The payment error taxonomy

pub mod errors;
pub mod money;
pub mod provider;
pub mod record;
pub mod request;
pub mod response;
pub mod state_machine;
pub mod status;
pub mod webhook;

pub use errors::PaymentError;
pub use money::{Currency, Money};
pub use provider::ProviderId;
pub use record::{PaymentRecord, StatusTransition};
pub use request::{CustomerDetails, LineItem, PaymentMethod, PaymentRequest, RequestMetadata};
pub use response::{PaymentResponse, ResponseError};
pub use state_machine::StateMachine;
pub use status::{plan_transition, PaymentStatus, TransitionOutcome};
pub use webhook::WebhookNotification;
