use crate::error::AppError;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_CLERK_API_URL: &str = "https://api.clerk.com";
const DEFAULT_PUSHER_CLUSTER: &str = "us2";

#[derive(Clone)]
pub struct HasuraConfig {
    pub url: String,
    pub admin_secret: String,
}

#[derive(Clone)]
pub struct ClerkConfig {
    pub api_url: String,
    pub secret_key: String,
    /// PEM public key used to verify session tokens.
    pub jwt_key: String,
}

#[derive(Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
}

#[derive(Clone)]
pub struct WebhookConfig {
    pub delete_signing_secret: String,
    /// Verification of `user.created` deliveries is skipped when unset.
    pub create_signing_secret: Option<String>,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub http_timeout: Duration,
    pub encryption_key: String,
    pub hasura: HasuraConfig,
    pub clerk: ClerkConfig,
    pub pusher: PusherConfig,
    pub webhooks: WebhookConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http_timeout", &self.http_timeout)
            .field("hasura_url", &self.hasura.url)
            .field("clerk_api_url", &self.clerk.api_url)
            .field("pusher_app_id", &self.pusher.app_id)
            .field("pusher_cluster", &self.pusher.cluster)
            .finish_non_exhaustive()
    }
}

fn required(name: &str) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!("{name} missing"))),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let host = optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = optional("SERVER_PORT")
            .or_else(|| optional("PORT"))
            .map(|p| {
                p.parse::<u16>()
                    .map_err(|_| AppError::Config(format!("invalid port: {p}")))
            })
            .transpose()?
            .unwrap_or(3000);
        let http_timeout = optional("HTTP_TIMEOUT_SECS")
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| AppError::Config(format!("invalid HTTP_TIMEOUT_SECS: {s}")))
            })
            .transpose()?
            .unwrap_or(10);

        let hasura = HasuraConfig {
            url: required("HASURA_GRAPHQL_URL")?,
            admin_secret: required("HASURA_GRAPHQL_ADMIN_SECRET")?,
        };

        let clerk = ClerkConfig {
            api_url: optional("CLERK_API_URL").unwrap_or_else(|| DEFAULT_CLERK_API_URL.to_string()),
            secret_key: required("CLERK_SECRET_KEY")
                .or_else(|_| required("NUXT_CLERK_SECRET_KEY"))
                .map_err(|_| AppError::Config("CLERK_SECRET_KEY missing".into()))?,
            jwt_key: required("CLERK_JWT_KEY")?,
        };

        let pusher = PusherConfig {
            app_id: required("PUSHER_APP_ID")?,
            key: required("PUSHER_APP_KEY")?,
            secret: required("PUSHER_APP_SECRET")?,
            cluster: optional("PUSHER_CLUSTER").unwrap_or_else(|| DEFAULT_PUSHER_CLUSTER.to_string()),
        };

        let webhooks = WebhookConfig {
            delete_signing_secret: required("DELETE_SIGNING_SECRET")?,
            create_signing_secret: optional("CREATE_SIGNING_SECRET"),
        };

        Ok(Self {
            host,
            port,
            http_timeout: Duration::from_secs(http_timeout),
            encryption_key: required("ENCRYPTION_KEY")?,
            hasura,
            clerk,
            pusher,
            webhooks,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
