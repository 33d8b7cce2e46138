use super::{GraphqlBackend, HasuraError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

/// Hasura GraphQL endpoint client, authenticated with the admin secret.
#[derive(Clone)]
pub struct HasuraClient {
    endpoint: String,
    admin_secret: String,
    http_client: reqwest::Client,
}

impl HasuraClient {
    pub fn new(
        endpoint: impl Into<String>,
        admin_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HasuraError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HasuraError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            admin_secret: admin_secret.into(),
            http_client,
        })
    }
}

#[async_trait]
impl GraphqlBackend for HasuraClient {
    async fn execute(&self, query: &str, variables: Value) -> Result<Value, HasuraError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(ADMIN_SECRET_HEADER, &self.admin_secret)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| HasuraError::Http(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HasuraError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| HasuraError::Decode(e.to_string()))?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(HasuraError::Graphql(messages));
        }

        debug!("graphql operation completed");
        Ok(body.data.unwrap_or(Value::Null))
    }
}
