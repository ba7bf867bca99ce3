//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `payfast`, `yoco`, `mock` - Payment gateway implementations
//! - `registry` - Gateway assembly and dispatch
//! - `postgres`, `memory` - Payment record stores
//! - `http` - REST API surface

pub mod http;
pub mod memory;
pub mod mock;
pub mod payfast;
pub mod postgres;
pub mod registry;
pub mod yoco;

pub use registry::{build_gateways, ProviderGateway};
