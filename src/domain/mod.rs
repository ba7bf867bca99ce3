//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `payment` - Payment model, canonical status machine, error taxonomy
pub mod payment;
