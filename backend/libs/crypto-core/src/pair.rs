//! Canonical ordering of two user ids and the realtime channel names built on it.
//!
//! Both participants of a conversation must land on the same channel and the
//! same friendship row regardless of who initiates, so every two-party name is
//! built from the pair in ascending byte order.

use crate::CryptoError;

/// Channel prefix for live sends from clients (authorized private channel).
pub const PRIVATE_CHAT_CHANNEL_PREFIX: &str = "private-chat-";
/// Channel prefix for fan-out of rows inserted in the GraphQL backend.
pub const CHAT_CHANNEL_PREFIX: &str = "chat-";

const NOTIFICATION_CHANNEL_PREFIX: &str = "notifications-";
const CALL_CHANNEL_PREFIX: &str = "private-call-";

/// Order two distinct ids ascending. Pairing a user with themself is an error.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> Result<(&'a str, &'a str), CryptoError> {
    if a == b {
        return Err(CryptoError::SelfPair);
    }
    if a < b {
        Ok((a, b))
    } else {
        Ok((b, a))
    }
}

/// `"{prefix}{first}-{second}"` for the canonical pair of `a` and `b`.
pub fn chat_channel(prefix: &str, a: &str, b: &str) -> Result<String, CryptoError> {
    let (first, second) = canonical_pair(a, b)?;
    Ok(format!("{prefix}{first}-{second}"))
}

/// Split a two-party channel name back into its ids.
///
/// The remainder after `prefix` is split at the first `-`; both halves must be
/// non-empty.
pub fn parse_chat_channel(prefix: &str, name: &str) -> Result<(String, String), CryptoError> {
    let rest = name
        .strip_prefix(prefix)
        .ok_or_else(|| CryptoError::InvalidChannel(name.to_string()))?;

    match rest.split_once('-') {
        Some((first, second)) if !first.is_empty() && !second.is_empty() => {
            Ok((first.to_string(), second.to_string()))
        }
        _ => Err(CryptoError::InvalidChannel(name.to_string())),
    }
}

pub fn notification_channel(user_id: &str) -> String {
    format!("{NOTIFICATION_CHANNEL_PREFIX}{user_id}")
}

pub fn call_channel(user_id: &str) -> String {
    format!("{CALL_CHANNEL_PREFIX}{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_orders_ascending() {
        assert_eq!(canonical_pair("bob", "alice").unwrap(), ("alice", "bob"));
        assert_eq!(canonical_pair("alice", "bob").unwrap(), ("alice", "bob"));
    }

    #[test]
    fn test_canonical_pair_is_symmetric() {
        for (a, b) in [("u1", "u2"), ("user_2Zb", "user_2Za"), ("A", "a"), ("", "x")] {
            assert_eq!(canonical_pair(a, b).unwrap(), canonical_pair(b, a).unwrap());
        }
    }

    #[test]
    fn test_self_pair_rejected() {
        assert_eq!(canonical_pair("u1", "u1"), Err(CryptoError::SelfPair));
        assert_eq!(
            chat_channel(CHAT_CHANNEL_PREFIX, "u1", "u1"),
            Err(CryptoError::SelfPair)
        );
    }

    #[test]
    fn test_chat_channel_names() {
        assert_eq!(
            chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, "bob", "alice").unwrap(),
            "private-chat-alice-bob"
        );
        assert_eq!(
            chat_channel(CHAT_CHANNEL_PREFIX, "alice", "bob").unwrap(),
            "chat-alice-bob"
        );
    }

    #[test]
    fn test_parse_chat_channel() {
        assert_eq!(
            parse_chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, "private-chat-alice-bob").unwrap(),
            ("alice".to_string(), "bob".to_string())
        );

        for bad in [
            "chat-alice-bob",
            "private-chat-alice",
            "private-chat--bob",
            "private-chat-alice-",
            "presence-chat-alice-bob",
        ] {
            assert!(
                matches!(
                    parse_chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, bad),
                    Err(CryptoError::InvalidChannel(_))
                ),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn test_single_user_channels() {
        assert_eq!(notification_channel("u1"), "notifications-u1");
        assert_eq!(call_channel("u1"), "private-call-u1");
    }
}
