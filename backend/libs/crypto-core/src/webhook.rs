//! Svix-style webhook signature verification.
//!
//! The identity provider signs `"{msg_id}.{timestamp}.{body}"` with
//! HMAC-SHA256 under a shared `whsec_<base64>` secret and sends one or more
//! `v1,<base64 signature>` entries, space separated, in `svix-signature`.

use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const ID_HEADER: &str = "svix-id";
pub const TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const SIGNATURE_HEADER: &str = "svix-signature";

/// Maximum allowed distance between the signed timestamp and now, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid timestamp header")]
    InvalidTimestamp,

    #[error("timestamp outside the allowed tolerance")]
    TimestampOutOfTolerance,

    #[error("no matching signature")]
    InvalidSignature,
}

/// The three signature headers of one delivery. Absent headers are `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebhookHeaders<'a> {
    pub id: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub signature: Option<&'a str>,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookVerifier(<redacted>)")
    }
}

impl WebhookVerifier {
    /// Build a verifier from a `whsec_`-prefixed (or bare) base64 secret.
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        if encoded.is_empty() {
            return Err(CryptoError::Config("webhook secret is empty".into()));
        }
        let key = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::Config(format!("webhook secret is not base64: {e}")))?;
        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| CryptoError::Config(format!("invalid webhook secret: {e}")))?;
        Ok(Self { mac })
    }

    pub fn verify(&self, headers: &WebhookHeaders<'_>, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify against an explicit `now` (unix seconds).
    pub fn verify_at(
        &self,
        headers: &WebhookHeaders<'_>,
        body: &[u8],
        now: i64,
    ) -> Result<(), WebhookError> {
        let id = headers.id.ok_or(WebhookError::MissingHeader(ID_HEADER))?;
        let timestamp = headers
            .timestamp
            .ok_or(WebhookError::MissingHeader(TIMESTAMP_HEADER))?;
        let signature = headers
            .signature
            .ok_or(WebhookError::MissingHeader(SIGNATURE_HEADER))?;

        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if now.abs_diff(ts) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac(id, timestamp, body);
        let matched = signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Produce the `v1,<base64>` signature entry for a delivery.
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> String {
        let tag = self.mac(id, timestamp, body).finalize().into_bytes();
        format!("{SIGNATURE_VERSION},{}", STANDARD.encode(tag))
    }

    fn mac(&self, id: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        mac
    }
}
