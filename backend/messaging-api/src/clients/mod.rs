//! External collaborators: the GraphQL backend, the identity provider and the
//! realtime broadcaster.
//!
//! Handlers only see the traits below. Concrete HTTP clients are built once in
//! `main` and injected through `AppState`, so tests swap in fakes.

pub mod clerk;
pub mod hasura;
pub mod pusher;

pub use clerk::ClerkClient;
pub use hasura::HasuraClient;
pub use pusher::PusherClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HasuraError {
    #[error("request to graphql backend failed: {0}")]
    Http(String),

    #[error("graphql backend responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("graphql errors: {0}")]
    Graphql(String),

    #[error("failed to decode graphql response: {0}")]
    Decode(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("request to identity provider failed: {0}")]
    Http(String),

    #[error("identity provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid verification key: {0}")]
    Key(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("request to broadcaster failed: {0}")]
    Http(String),

    #[error("broadcaster responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to encode event payload: {0}")]
    Encode(String),
}

/// Executes parameterized GraphQL operations against the hosted backend.
#[async_trait]
pub trait GraphqlBackend: Send + Sync {
    /// Run `query` with `variables` and return the `data` object.
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, HasuraError>;
}

impl dyn GraphqlBackend {
    /// Run `query` and deserialize `data` into `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, HasuraError> {
        let data = self.execute(query, variables).await?;
        serde_json::from_value(data).map_err(|e| HasuraError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub id: String,
    pub email_address: String,
}

/// A user record as the identity provider describes it.
///
/// The same shape arrives in `user.created` webhook payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
}

impl ProviderUser {
    /// `"first last"` with blanks dropped; `None` when both are empty.
    pub fn display_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }

    /// The primary address, falling back to the first listed one.
    pub fn primary_email(&self) -> Option<&str> {
        self.primary_email_address_id
            .as_deref()
            .and_then(|primary| self.email_addresses.iter().find(|e| e.id == primary))
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }
}

/// Verifies session tokens and looks up users at the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validate a session token and return its subject (the user id).
    async fn verify_session(&self, token: &str) -> Result<String, IdentityError>;

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError>;
}

/// Signed private-channel authorization returned to realtime clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAuth {
    pub auth: String,
}

/// Channel-based fan-out to connected realtime clients.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, channel: &str, event: &str, payload: &Value)
        -> Result<(), BroadcastError>;

    async fn authorize_channel(
        &self,
        socket_id: &str,
        channel: &str,
    ) -> Result<ChannelAuth, BroadcastError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> ProviderUser {
        ProviderUser {
            id: "user_1".into(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(Some("Ada"), Some("Lovelace")).display_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(user(Some("Ada"), None).display_name().as_deref(), Some("Ada"));
        assert_eq!(user(Some(""), Some("Lovelace")).display_name().as_deref(), Some("Lovelace"));
        assert_eq!(user(Some(" "), Some("")).display_name(), None);
        assert_eq!(user(None, None).display_name(), None);
    }

    #[test]
    fn test_primary_email_prefers_primary_id() {
        let mut u = user(None, None);
        u.email_addresses = vec![
            EmailAddress {
                id: "idn_1".into(),
                email_address: "old@example.com".into(),
            },
            EmailAddress {
                id: "idn_2".into(),
                email_address: "main@example.com".into(),
            },
        ];
        assert_eq!(u.primary_email(), Some("old@example.com"));

        u.primary_email_address_id = Some("idn_2".into());
        assert_eq!(u.primary_email(), Some("main@example.com"));

        u.primary_email_address_id = Some("idn_missing".into());
        assert_eq!(u.primary_email(), Some("old@example.com"));

        u.email_addresses.clear();
        assert_eq!(u.primary_email(), None);
    }

    #[test]
    fn test_provider_user_from_webhook_shape() {
        let u: ProviderUser = serde_json::from_value(serde_json::json!({
            "id": "user_2x",
            "first_name": "Grace",
            "last_name": null,
            "email_addresses": [{"id": "idn_9", "email_address": "grace@example.com"}],
            "primary_email_address_id": "idn_9",
            "external_accounts": []
        }))
        .unwrap();
        assert_eq!(u.display_name().as_deref(), Some("Grace"));
        assert_eq!(u.primary_email(), Some("grace@example.com"));
    }
}
