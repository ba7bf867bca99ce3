//! Yoco webhook signature verification.
//!
//! Yoco signs webhooks with HMAC-SHA256 over `"{id}.{timestamp}.{body}"`,
//! keyed by the base64 portion of the `whsec_` signing secret. The
//! `webhook-signature` header carries one or more space-separated
//! `v1,<base64>` entries (older entries remain valid during secret
//! rotation); verification passes if any entry matches.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Verifier for Yoco webhook signatures.
pub struct YocoWebhookVerifier {
    key: Vec<u8>,
}

impl YocoWebhookVerifier {
    /// Build from a `whsec_...` signing secret.
    ///
    /// Returns `None` when the secret has the wrong prefix or is not
    /// valid base64; a verifier can never be constructed with a key it
    /// cannot sign with.
    pub fn new(signing_secret: &str) -> Option<Self> {
        let encoded = signing_secret.strip_prefix("whsec_")?;
        let key = BASE64.decode(encoded).ok()?;
        Some(Self { key })
    }

    /// Verify a webhook delivery.
    ///
    /// `id` and `timestamp` come from the `webhook-id` and
    /// `webhook-timestamp` headers; `signature_header` is the raw
    /// `webhook-signature` value. Fail-closed on any malformed input.
    pub fn verify(&self, payload: &[u8], id: &str, timestamp: &str, signature_header: &str) -> bool {
        let Ok(ts) = timestamp.parse::<i64>() else {
            return false;
        };
        if !self.timestamp_in_window(ts) {
            return false;
        }

        let expected = self.compute_signature(id, timestamp, payload);

        signature_header.split_whitespace().any(|entry| {
            let Some((version, signature)) = entry.split_once(',') else {
                return false;
            };
            if version != "v1" {
                return false;
            }
            match BASE64.decode(signature) {
                Ok(candidate) => {
                    candidate.len() == expected.len()
                        && bool::from(candidate.ct_eq(&expected))
                }
                Err(_) => false,
            }
        })
    }

    fn timestamp_in_window(&self, timestamp: i64) -> bool {
        let age = chrono::Utc::now().timestamp() - timestamp;
        age <= MAX_TIMESTAMP_AGE_SECS && age >= -MAX_FUTURE_TOLERANCE_SECS
    }

    fn compute_signature(&self, id: &str, timestamp: &str, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Computes a valid signature header for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(signing_secret: &str, id: &str, timestamp: i64, payload: &[u8]) -> String {
    let key = BASE64
        .decode(signing_secret.strip_prefix("whsec_").unwrap())
        .unwrap();
    let mut mac = HmacSha256::new_from_slice(&key).unwrap();
    mac.update(format!("{}.{}.", id, timestamp).as_bytes());
    mac.update(payload);
    format!("v1,{}", BASE64.encode(mac.finalize().into_bytes()))
}
