//! HTTP adapter for payment endpoints.
//!
//! Exposes the payment orchestrator via REST API:
//! - `POST /api/payments` - Create a payment
//! - `GET /api/payments/status` - Current payment state
//! - `GET /api/payments/providers` - Configured providers and capabilities
//! - `POST /api/webhooks?provider=..` - Receive a provider notification
//! - `GET /api/webhooks?provider=..` - Endpoint validation handshake

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedCustomer, PaymentsAppState};
pub use routes::payments_router;
