//! PayFast signature scheme.
//!
//! PayFast signs with an MD5 hash over URL-encoded parameter pairs plus the
//! merchant passphrase. Three variants share one encoder:
//!
//! - **Request signing**: pairs in the order they appear in the request body
//! - **ITN verification**: pairs in the order they arrived, excluding the
//!   embedded `signature` field
//! - **API signing**: pairs sorted alphabetically by name, passphrase
//!   included as a parameter
//!
//! The encoder is PayFast's own dialect: spaces become `+` and percent
//! escapes use uppercase hex. A byte-for-byte match is required or the
//! hashes diverge.

use subtle::ConstantTimeEq;

/// URL-encode a value the way PayFast's signature base string expects.
pub fn pf_urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

fn signature_base<'a>(
    params: impl Iterator<Item = (&'a str, &'a str)>,
    passphrase: Option<&str>,
) -> String {
    let mut base = String::new();
    for (name, value) in params {
        if value.is_empty() {
            continue;
        }
        if !base.is_empty() {
            base.push('&');
        }
        base.push_str(name);
        base.push('=');
        base.push_str(&pf_urlencode(value));
    }
    if let Some(passphrase) = passphrase {
        if !base.is_empty() {
            base.push('&');
        }
        base.push_str("passphrase=");
        base.push_str(&pf_urlencode(passphrase));
    }
    base
}

/// Sign parameters in the order given, passphrase appended last.
///
/// Used for checkout requests, where the field order of the request body is
/// the signing order.
pub fn sign_ordered(params: &[(String, String)], passphrase: &str) -> String {
    let base = signature_base(
        params.iter().map(|(n, v)| (n.as_str(), v.as_str())),
        Some(passphrase),
    );
    format!("{:x}", md5::compute(base.as_bytes()))
}

/// Sign parameters sorted alphabetically by name, passphrase included as a
/// parameter.
///
/// Used for the merchant API (status queries), which sorts every input to
/// the hash.
pub fn sign_alphabetical(params: &[(String, String)], passphrase: &str) -> String {
    let mut sorted: Vec<(&str, &str)> = params
        .iter()
        .map(|(n, v)| (n.as_str(), v.as_str()))
        .collect();
    sorted.push(("passphrase", passphrase));
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let base = signature_base(sorted.into_iter(), None);
    format!("{:x}", md5::compute(base.as_bytes()))
}

/// Verify an ITN body against its embedded signature.
///
/// The body is `application/x-www-form-urlencoded`; the hash covers every
/// pair in arrival order except `signature` itself, with the passphrase
/// appended. Fail-closed: a body without a signature field never verifies.
pub fn verify_itn(raw_body: &[u8], passphrase: &str) -> bool {
    let pairs: Vec<(String, String)> = form_urlencoded_pairs(raw_body);

    let mut received: Option<String> = None;
    let mut signed: Vec<(String, String)> = Vec::with_capacity(pairs.len());
    for (name, value) in pairs {
        if name == "signature" {
            received = Some(value);
        } else {
            signed.push((name, value));
        }
    }

    let Some(received) = received else {
        return false;
    };

    let expected = sign_ordered(&signed, passphrase);
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

/// Decode a form-urlencoded body into pairs, preserving arrival order.
pub fn form_urlencoded_pairs(raw_body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw_body)
        .map(|(n, v)| (n.into_owned(), v.into_owned()))
        .collect()
}
