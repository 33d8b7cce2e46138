//! Identity-provider webhooks that mirror user lifecycle into the backend.

use crate::clients::ProviderUser;
use crate::error::AppError;
use crate::models::NewUser;
use crate::repository::UserRepository;
use crate::state::AppState;
use actix_web::{post, web, HttpRequest, HttpResponse};
use crypto_core::webhook::{ID_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crypto_core::{WebhookHeaders, WebhookVerifier};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

const USER_CREATED: &str = "user.created";

#[derive(Debug, Deserialize)]
struct UserCreatedEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    data: ProviderUser,
}

#[derive(Debug, Deserialize)]
struct DeletedUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserDeletedEvent {
    data: DeletedUser,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

fn verify(verifier: &WebhookVerifier, req: &HttpRequest, body: &[u8]) -> Result<(), AppError> {
    let headers = WebhookHeaders {
        id: header(req, ID_HEADER),
        timestamp: header(req, TIMESTAMP_HEADER),
        signature: header(req, SIGNATURE_HEADER),
    };
    verifier.verify(&headers, body).map_err(|e| {
        warn!(error = %e, "webhook verification failed");
        AppError::Unauthorized(e.to_string())
    })
}

fn parse<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid JSON payload: {e}")))
}

/// POST /api/userupdate: `user.created` deliveries.
#[post("/userupdate")]
pub async fn user_created(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    if let Some(verifier) = &state.create_webhook {
        verify(verifier, &req, &body)?;
    }

    let event: UserCreatedEvent = parse(&body)?;
    if let Some(kind) = event.kind.as_deref().filter(|k| *k != USER_CREATED) {
        info!(kind, "ignoring webhook event");
        return Ok(HttpResponse::Ok().json(json!({ "status": "ignored" })));
    }

    let user = event.data;
    if user.id.is_empty() {
        return Err(AppError::BadRequest("missing user id".into()));
    }
    let email = user
        .primary_email()
        .ok_or_else(|| AppError::BadRequest("user has no email address".into()))?
        .to_string();

    let new_user = NewUser {
        id: user.id.clone(),
        name: user.display_name(),
        email,
    };
    UserRepository::new(state.graphql.clone())
        .insert(&new_user)
        .await?;

    info!(user_id = %new_user.id, "user created");
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// POST /api/userdelete: `user.deleted` deliveries; signature required.
#[post("/userdelete")]
pub async fn user_deleted(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    verify(&state.delete_webhook, &req, &body)?;

    let event: UserDeletedEvent = parse(&body)?;
    let affected = UserRepository::new(state.graphql.clone())
        .delete(&event.data.id)
        .await?;

    info!(user_id = %event.data.id, affected, "user deleted");
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
