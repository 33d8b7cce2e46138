//! Clerk identity provider client.
//!
//! Session tokens are RS256 JWTs signed by the Clerk instance; they are
//! verified locally against the instance PEM public key. User lookups go to the
//! Backend API with the secret key.

use super::{IdentityError, IdentityProvider, ProviderUser};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

#[derive(Clone)]
pub struct ClerkClient {
    api_url: String,
    secret_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
    http_client: reqwest::Client,
}

impl ClerkClient {
    /// `jwt_public_key` is the instance PEM; literal `\n` sequences from
    /// single-line env values are accepted.
    pub fn new(
        api_url: impl Into<String>,
        secret_key: impl Into<String>,
        jwt_public_key: &str,
        timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let pem = jwt_public_key.replace("\\n", "\n");
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| IdentityError::Key(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        // session tokens carry no audience
        validation.validate_aud = false;
        validation.leeway = 5;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            decoding_key,
            validation,
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn verify_session(&self, token: &str) -> Result<String, IdentityError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| IdentityError::InvalidSession(e.to_string()))?;
        Ok(data.claims.sub)
    }

    async fn get_user(&self, user_id: &str) -> Result<ProviderUser, IdentityError> {
        let url = format!("{}/v1/users/{}", self.api_url, user_id);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| IdentityError::Http(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<ProviderUser>()
                .await
                .map_err(|e| IdentityError::Http(format!("failed to parse user: {e}"))),
            reqwest::StatusCode::NOT_FOUND => Err(IdentityError::UserNotFound(user_id.to_string())),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(IdentityError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}
