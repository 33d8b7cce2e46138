use super::{BroadcastError, Broadcaster, ChannelAuth};
use async_trait::async_trait;
use crypto_core::{hmac_sha256_hex, sign_channel_auth};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const AUTH_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
struct TriggerEvent<'a> {
    name: &'a str,
    channels: [&'a str; 1],
    data: String,
}

/// Pusher Channels HTTP API client.
#[derive(Clone)]
pub struct PusherClient {
    app_id: String,
    key: String,
    secret: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl PusherClient {
    pub fn new(
        app_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
        cluster: &str,
        timeout: Duration,
    ) -> Result<Self, BroadcastError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BroadcastError::Http(e.to_string()))?;

        Ok(Self {
            app_id: app_id.into(),
            key: key.into(),
            secret: secret.into(),
            base_url: format!("https://api-{cluster}.pusher.com"),
            http_client,
        })
    }

    /// Point the client at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_path(&self) -> String {
        format!("/apps/{}/events", self.app_id)
    }

    /// Signed query string for a POST of `body` to `path` at `timestamp`.
    fn signed_query(&self, path: &str, body: &[u8], timestamp: i64) -> String {
        // keys already in lexical order
        let query = format!(
            "auth_key={}&auth_timestamp={}&auth_version={}&body_md5={:x}",
            self.key,
            timestamp,
            AUTH_VERSION,
            md5::compute(body)
        );
        let to_sign = format!("POST\n{path}\n{query}");
        let signature = hmac_sha256_hex(self.secret.as_bytes(), to_sign.as_bytes());
        format!("{query}&auth_signature={signature}")
    }
}

#[async_trait]
impl Broadcaster for PusherClient {
    async fn broadcast(
        &self,
        channel: &str,
        event: &str,
        payload: &Value,
    ) -> Result<(), BroadcastError> {
        let body = serde_json::to_vec(&TriggerEvent {
            name: event,
            channels: [channel],
            data: payload.to_string(),
        })
        .map_err(|e| BroadcastError::Encode(e.to_string()))?;

        let path = self.events_path();
        let query = self.signed_query(&path, &body, chrono::Utc::now().timestamp());
        let url = format!("{}{}?{}", self.base_url, path, query);

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| BroadcastError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BroadcastError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(channel, event, "event triggered");
        Ok(())
    }

    async fn authorize_channel(
        &self,
        socket_id: &str,
        channel: &str,
    ) -> Result<ChannelAuth, BroadcastError> {
        Ok(ChannelAuth {
            auth: sign_channel_auth(&self.key, &self.secret, socket_id, channel),
        })
    }
}
