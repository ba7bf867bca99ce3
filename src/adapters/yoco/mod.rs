//! Yoco payment gateway integration.
//!
//! - `adapter` - The `PaymentGateway` implementation
//! - `webhook` - Rotating-secret HMAC webhook verification
//! - `types` - Wire types and the native status mappings

mod adapter;
mod types;
pub mod webhook;

pub use adapter::YocoAdapter;
