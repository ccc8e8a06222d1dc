//! HMAC-SHA256 request signatures over millisecond timestamps.
//!
//! A caller proves it holds the shared secret by sending
//! `hex(HMAC-SHA256(secret, timestamp))` together with the decimal
//! millisecond timestamp it signed. Timestamps outside the allowed skew are
//! rejected before the MAC is checked.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Why a signed request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing signature or timestamp.")]
    Missing,

    #[error("Malformed signature.")]
    Malformed,

    /// Outside the allowed skew, or not a number at all.
    #[error("Timestamp expired.")]
    Expired,

    #[error("Invalid signature.")]
    Invalid,
}

impl AuthError {
    /// HTTP status the API answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Missing => 401,
            AuthError::Malformed => 400,
            AuthError::Expired | AuthError::Invalid => 403,
        }
    }
}

// ---------------------------------------------------------------------------
// RequestSigner
// ---------------------------------------------------------------------------

/// A timestamp and its signature, as returned by the admin signature endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedSignature {
    pub timestamp: String,
    pub signature: String,
}

pub struct RequestSigner {
    secret: SecretString,
    max_age: Duration,
}

impl RequestSigner {
    pub fn new(secret: &SecretString, max_age_secs: i64) -> Self {
        Self {
            secret: SecretString::from(secret.expose_secret().to_string()),
            max_age: Duration::seconds(max_age_secs),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length")
    }

    /// Hex signature of `timestamp`.
    pub fn sign(&self, timestamp: &str) -> String {
        let mut mac = self.mac();
        mac.update(timestamp.as_bytes());
        hex_encode(&mac.finalize().into_bytes())
    }

    /// Sign the current time.
    pub fn issue(&self, now: DateTime<Utc>) -> IssuedSignature {
        let timestamp = now.timestamp_millis().to_string();
        let signature = self.sign(&timestamp);
        IssuedSignature {
            timestamp,
            signature,
        }
    }

    /// Check a signature/timestamp pair taken from a request body.
    pub fn verify(
        &self,
        signature: Option<&str>,
        timestamp: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let (Some(signature), Some(timestamp)) = (
            signature.filter(|s| !s.is_empty()),
            timestamp.filter(|t| !t.is_empty()),
        ) else {
            return Err(AuthError::Missing);
        };

        if signature.len() != 64 || !signature.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AuthError::Malformed);
        }

        let millis = parse_millis(timestamp).ok_or(AuthError::Expired)?;
        let skew = (now.timestamp_millis() - millis).abs();
        if skew > self.max_age.num_milliseconds() {
            return Err(AuthError::Expired);
        }

        let expected = hex_decode(signature).ok_or(AuthError::Malformed)?;
        let mut mac = self.mac();
        mac.update(timestamp.as_bytes());
        // Constant-time verification (via hmac crate's `verify_slice`)
        mac.verify_slice(&expected).map_err(|_| AuthError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Admin credentials
// ---------------------------------------------------------------------------

/// Compare supplied credentials against the configured pair.
///
/// Unconfigured credentials never match.
pub fn credentials_match(expected_user: &str, expected_pass: &str, user: &str, pass: &str) -> bool {
    if expected_user.is_empty() || expected_pass.is_empty() {
        return false;
    }
    // Evaluate both so timing does not reveal which one failed.
    let user_ok = constant_time_eq(expected_user.as_bytes(), user.as_bytes());
    let pass_ok = constant_time_eq(expected_pass.as_bytes(), pass.as_bytes());
    user_ok & pass_ok
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a decimal millisecond timestamp. Fractions are truncated.
fn parse_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n as i64)
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Constant-time byte comparison (XOR-based).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
