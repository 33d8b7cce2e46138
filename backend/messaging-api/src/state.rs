use crate::clients::{Broadcaster, GraphqlBackend, IdentityProvider};
use crypto_core::{MessageSecret, WebhookVerifier};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub graphql: Arc<dyn GraphqlBackend>,
    pub identity: Arc<dyn IdentityProvider>,
    pub broadcaster: Arc<dyn Broadcaster>,
    /// Server secret for per-sender message keys
    pub message_secret: MessageSecret,
    pub delete_webhook: Arc<WebhookVerifier>,
    /// `None` accepts `user.created` deliveries unverified
    pub create_webhook: Option<Arc<WebhookVerifier>>,
}
