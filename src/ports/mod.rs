//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Gateway Port
//!
//! - `PaymentGateway` - One payment provider: creation, status polling,
//!   webhook verification and parsing
//!
//! ## Store Port
//!
//! - `PaymentStore` - Canonical payment records and the atomic status
//!   transition rule

mod payment_gateway;
mod payment_store;

pub use payment_gateway::{
    CreatedPayment, GatewayError, PaymentGateway, ProcessingFee, ProviderCapabilities,
};
pub use payment_store::{PaymentStore, StoreError};
