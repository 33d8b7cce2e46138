use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use crypto_core::{MessageSecret, WebhookVerifier};
use messaging_api::clients::{ClerkClient, HasuraClient, PusherClient};
use messaging_api::config::Config;
use messaging_api::logging::init_tracing;
use messaging_api::routes;
use messaging_api::state::AppState;
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(?config, "Starting messaging-api");

    let message_secret =
        MessageSecret::new(config.encryption_key.clone()).context("Invalid ENCRYPTION_KEY")?;

    let graphql = HasuraClient::new(
        config.hasura.url.clone(),
        config.hasura.admin_secret.clone(),
        config.http_timeout,
    )
    .context("Failed to build GraphQL client")?;

    let identity = ClerkClient::new(
        config.clerk.api_url.clone(),
        config.clerk.secret_key.clone(),
        &config.clerk.jwt_key,
        config.http_timeout,
    )
    .context("Failed to build identity client")?;

    let broadcaster = PusherClient::new(
        config.pusher.app_id.clone(),
        config.pusher.key.clone(),
        config.pusher.secret.clone(),
        &config.pusher.cluster,
        config.http_timeout,
    )
    .context("Failed to build realtime client")?;

    let delete_webhook = WebhookVerifier::new(&config.webhooks.delete_signing_secret)
        .context("Invalid DELETE_SIGNING_SECRET")?;
    let create_webhook = config
        .webhooks
        .create_signing_secret
        .as_deref()
        .map(WebhookVerifier::new)
        .transpose()
        .context("Invalid CREATE_SIGNING_SECRET")?;
    if create_webhook.is_none() {
        info!("CREATE_SIGNING_SECRET not set; user.created deliveries are not verified");
    }

    let state = AppState {
        graphql: Arc::new(graphql),
        identity: Arc::new(identity),
        broadcaster: Arc::new(broadcaster),
        message_secret,
        delete_webhook: Arc::new(delete_webhook),
        create_webhook: create_webhook.map(Arc::new),
    };

    let bind_address = config.bind_address();
    info!("messaging-api listening on http://{}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("Server error")?;

    Ok(())
}
