use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row of the `users` table. Each query selects a different subset of
/// columns, so every field is optional and absent ones are not echoed back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
}

/// Profile fields a user may edit about themself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub id: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub language: Option<Vec<String>>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
}

/// Row of the `messages` table. `encrypted_content` holds hex ciphertext and
/// `key` the hex IV; after decryption the plaintext replaces the ciphertext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub id: Value,
    pub sender_id: String,
    pub recipient_id: String,
    pub encrypted_content: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub created_at: String,
}

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

/// Row of the `friends` table, keyed by the canonical pair
/// (`user_id` < `friend_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipRow {
    pub id: Value,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub friend_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub to_accept: String,
}

/// RFC 3339 timestamp with nanoseconds, as stored in `timestamptz` columns.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_omits_unselected_columns() {
        let profile: UserProfile = serde_json::from_value(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "profile_picture": null,
            "last_seen": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let out = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            out,
            json!({"name": "Ada", "email": "ada@example.com", "last_seen": "2024-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn test_stored_message_accepts_numeric_and_string_ids() {
        for id in [json!(7), json!("7b1c")] {
            let msg: StoredMessage = serde_json::from_value(json!({
                "id": id,
                "sender_id": "a",
                "recipient_id": "b",
                "encrypted_content": "00ff",
                "key": "00",
                "created_at": "2024-01-01T00:00:00Z"
            }))
            .unwrap();
            assert_eq!(msg.id, id);
        }
    }

    #[test]
    fn test_now_timestamp_is_rfc3339() {
        let ts = now_timestamp();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(ts.ends_with('Z'));
    }
}
