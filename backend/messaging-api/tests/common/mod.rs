//! In-memory stand-ins for the GraphQL backend, identity provider and
//! realtime broadcaster.

#![allow(dead_code)]

use async_trait::async_trait;
use crypto_core::{MessageSecret, WebhookVerifier};
use messaging_api::clients::{
    BroadcastError, Broadcaster, ChannelAuth, GraphqlBackend, HasuraError, IdentityError,
    IdentityProvider, ProviderUser,
};
use messaging_api::state::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const ENCRYPTION_KEY: &str = "integration-test-secret";
pub const DELETE_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

/// Name of the operation in a GraphQL document, e.g. `GetUserIdByEmail`.
pub fn operation_name(query: &str) -> String {
    let mut tokens = query.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "query" || token == "mutation" {
            if let Some(name) = tokens.next() {
                return name.split('(').next().unwrap_or(name).to_string();
            }
        }
    }
    String::new()
}

/// Answers each operation with a canned `data` object and records every call.
#[derive(Default)]
pub struct FakeGraphql {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeGraphql {
    pub fn respond(&self, operation: &str, data: Value) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .insert(operation.to_string(), data);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    /// Variables of every call to `operation`, in order.
    pub fn calls_to(&self, operation: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(name, _)| name == operation)
            .map(|(_, vars)| vars)
            .collect()
    }
}

#[async_trait]
impl GraphqlBackend for FakeGraphql {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, HasuraError> {
        let operation = operation_name(query);
        self.calls
            .lock()
            .unwrap()
            .push((operation.clone(), variables));
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&operation)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

/// Accepts tokens of the form `token-<user id>`.
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_session(&self, token: &str) -> Result<String, IdentityError> {
        token
            .strip_prefix("token-")
            .map(String::from)
            .ok_or_else(|| IdentityError::InvalidSession("unknown token".into()))
    }

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError> {
        Ok(ProviderUser {
            id: user_id.to_string(),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Broadcast {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

#[derive(Default)]
pub struct FakeBroadcaster {
    sent: Mutex<Vec<Broadcast>>,
    attempts: Mutex<Vec<Broadcast>>,
    failing: AtomicBool,
}

impl FakeBroadcaster {
    /// Successfully delivered events.
    pub fn sent(&self) -> Vec<Broadcast> {
        self.sent.lock().unwrap().clone()
    }

    /// Every broadcast tried, delivered or not.
    pub fn attempts(&self) -> Vec<Broadcast> {
        self.attempts.lock().unwrap().clone()
    }

    /// Make every following broadcast fail with a 503.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Broadcaster for FakeBroadcaster {
    async fn broadcast(
        &self,
        channel: &str,
        event: &str,
        payload: &Value,
    ) -> Result<(), BroadcastError> {
        let event = Broadcast {
            channel: channel.to_string(),
            event: event.to_string(),
            payload: payload.clone(),
        };
        self.attempts.lock().unwrap().push(event.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(BroadcastError::Status {
                status: 503,
                body: "service unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(event);
        Ok(())
    }

    async fn authorize_channel(
        &self,
        socket_id: &str,
        channel: &str,
    ) -> Result<ChannelAuth, BroadcastError> {
        Ok(ChannelAuth {
            auth: crypto_core::sign_channel_auth("app-key", "app-secret", socket_id, channel),
        })
    }
}

pub struct Harness {
    pub graphql: Arc<FakeGraphql>,
    pub broadcaster: Arc<FakeBroadcaster>,
    pub state: AppState,
}

pub fn harness() -> Harness {
    harness_with_create_secret(None)
}

pub fn harness_with_create_secret(create_secret: Option<&str>) -> Harness {
    let graphql = Arc::new(FakeGraphql::default());
    let broadcaster = Arc::new(FakeBroadcaster::default());

    let state = AppState {
        graphql: graphql.clone(),
        identity: Arc::new(FakeIdentity),
        broadcaster: broadcaster.clone(),
        message_secret: MessageSecret::new(ENCRYPTION_KEY).unwrap(),
        delete_webhook: Arc::new(WebhookVerifier::new(DELETE_SECRET).unwrap()),
        create_webhook: create_secret.map(|s| Arc::new(WebhookVerifier::new(s).unwrap())),
    };

    Harness {
        graphql,
        broadcaster,
        state,
    }
}

pub fn bearer(user_id: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer token-{user_id}"))
}
