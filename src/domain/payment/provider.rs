//! Provider identity.
//!
//! A closed set of tagged variants, one per supported processor. Adding a
//! provider is a compile-time-checked change: the exhaustive matches here
//! and in the adapter registry will not compile until the new variant is
//! handled everywhere.

use serde::{Deserialize, Serialize};

use super::errors::PaymentError;

/// Identifier of a configured payment processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Payfast,
    Yoco,
    Mock,
}

impl ProviderId {
    /// All known providers, in declaration order.
    pub const ALL: [ProviderId; 3] = [ProviderId::Payfast, ProviderId::Yoco, ProviderId::Mock];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Payfast => "payfast",
            ProviderId::Yoco => "yoco",
            ProviderId::Mock => "mock",
        }
    }

    /// The HTTP header carrying this provider's webhook signature.
    ///
    /// `None` means the signature travels inside the body (PayFast's ITN
    /// embeds it as a form field) and the transport must not look for a
    /// header at all. This table replaces order-dependent header sniffing:
    /// the transport consults it by name, and a declared-but-absent header
    /// is a verification failure.
    pub fn signature_header(&self) -> Option<&'static str> {
        match self {
            ProviderId::Payfast => None,
            ProviderId::Yoco => Some("webhook-signature"),
            ProviderId::Mock => Some("x-mock-signature"),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "payfast" => Ok(ProviderId::Payfast),
            "yoco" => Ok(ProviderId::Yoco),
            "mock" => Ok(ProviderId::Mock),
            other => Err(PaymentError::unknown_provider(other)),
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
