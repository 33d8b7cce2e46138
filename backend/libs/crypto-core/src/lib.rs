//! Message confidentiality and identity pairing primitives.
//!
//! Everything in this crate is pure and synchronous: no I/O, no shared mutable
//! state. Handlers call these functions directly from request context.
//!
//! - [`key`]: per-sender key derivation from a server-held secret
//! - [`cipher`]: AES-256-CFB encryption with a random IV per message
//! - [`pair`]: canonical ordering of two user ids and realtime channel names
//! - [`webhook`]: signature verification for identity-provider webhooks
//! - [`channel_auth`]: private-channel authorization signatures

pub mod channel_auth;
pub mod cipher;
pub mod hash;
pub mod key;
pub mod pair;
pub mod webhook;

pub use channel_auth::{hmac_sha256_hex, sign_channel_auth};
pub use cipher::{decrypt, encrypt, EncryptedMessage, IV_LEN};
pub use hash::sha256;
pub use key::{derive_key, MessageKey, MessageSecret};
pub use pair::{
    call_channel, canonical_pair, chat_channel, notification_channel, parse_chat_channel,
    CHAT_CHANNEL_PREFIX, PRIVATE_CHAT_CHANNEL_PREFIX,
};
pub use webhook::{WebhookError, WebhookHeaders, WebhookVerifier};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("hex decode error: {0}")]
    Decode(String),

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("cannot pair a user with themself")]
    SelfPair,

    #[error("invalid channel name: {0}")]
    InvalidChannel(String),
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::Decode(e.to_string())
    }
}
