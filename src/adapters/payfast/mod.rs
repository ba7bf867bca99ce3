//! PayFast payment gateway integration.
//!
//! - `adapter` - The `PaymentGateway` implementation
//! - `signature` - MD5 parameter-hash signing and ITN verification
//! - `types` - Wire types and the native status mapping

mod adapter;
pub mod signature;
mod types;

pub use adapter::PayfastAdapter;
