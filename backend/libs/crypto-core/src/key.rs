//! Per-sender key derivation.
//!
//! A message key is `SHA-256(user_id || server_secret)`, used directly as an
//! AES-256 key. Nothing is persisted: any process holding the server secret can
//! recompute the key of a message's sender from the sender id alone.

use crate::hash::sha256_concat;
use crate::CryptoError;
use std::fmt;

/// 256-bit symmetric key derived for one sender.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageKey([u8; 32]);

impl MessageKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageKey(..)")
    }
}

/// Derive the message key for `user_id` under `server_secret`.
///
/// The key is always derived from the *sender's* id, so decrypting a stored
/// message requires knowing which side wrote it.
pub fn derive_key(user_id: &str, server_secret: &str) -> Result<MessageKey, CryptoError> {
    if server_secret.is_empty() {
        return Err(CryptoError::Config("server secret is empty".into()));
    }
    if user_id.is_empty() {
        return Err(CryptoError::InvalidIdentifier("user id is empty".into()));
    }
    Ok(MessageKey(sha256_concat(&[
        user_id.as_bytes(),
        server_secret.as_bytes(),
    ])))
}

/// Process-wide server secret, validated once at startup.
///
/// Read-only after construction; share it behind an `Arc` or clone it freely.
#[derive(Clone)]
pub struct MessageSecret(String);

impl MessageSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, CryptoError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CryptoError::Config("server secret is empty".into()));
        }
        Ok(Self(secret))
    }

    pub fn derive_key(&self, user_id: &str) -> Result<MessageKey, CryptoError> {
        derive_key(user_id, &self.0)
    }
}

impl fmt::Debug for MessageSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageSecret(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_derive_key_is_deterministic() {
        let k1 = derive_key("u1", "s3cr3t").unwrap();
        let k2 = derive_key("u1", "s3cr3t").unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn test_derive_key_is_digest_of_concatenation() {
        let key = derive_key("u1", "s3cr3t").unwrap();
        assert_eq!(key.as_bytes(), &sha256(b"u1s3cr3t"));
    }

    #[test]
    fn test_derive_key_changes_with_either_input() {
        let base = derive_key("u1", "s3cr3t").unwrap();
        assert_ne!(base, derive_key("u2", "s3cr3t").unwrap());
        assert_ne!(base, derive_key("u1", "s3cr3t!").unwrap());
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        assert!(matches!(derive_key("u1", ""), Err(CryptoError::Config(_))));
        assert!(matches!(MessageSecret::new(""), Err(CryptoError::Config(_))));
    }

    #[test]
    fn test_empty_user_id_rejected() {
        assert!(matches!(
            derive_key("", "s3cr3t"),
            Err(CryptoError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_secret_matches_free_function_and_redacts_debug() {
        let secret = MessageSecret::new("s3cr3t").unwrap();
        assert_eq!(
            secret.derive_key("u1").unwrap(),
            derive_key("u1", "s3cr3t").unwrap()
        );
        assert!(!format!("{secret:?}").contains("s3cr3t"));
    }
}
