use crate::clients::{BroadcastError, HasuraError, IdentityError};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use crypto_core::CryptoError;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code used in the `error` field of responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::StartServer(_) => "start_server",
            AppError::BadRequest(_) => "bad_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Backend(_) => "backend_error",
            AppError::Upstream(_) => "upstream_error",
            AppError::Encryption(_) => "encryption_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Config(m)
            | AppError::StartServer(m)
            | AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m)
            | AppError::Conflict(m)
            | AppError::Backend(m)
            | AppError::Upstream(m)
            | AppError::Encryption(m)
            | AppError::Internal(m) => m,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::StartServer(_)
            | AppError::Backend(_)
            | AppError::Encryption(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.message(),
        }))
    }
}

impl From<HasuraError> for AppError {
    fn from(e: HasuraError) -> Self {
        AppError::Backend(e.to_string())
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidSession(_) | IdentityError::UserNotFound(_) => {
                AppError::Unauthorized("session not found".into())
            }
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<BroadcastError> for AppError {
    fn from(e: BroadcastError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl From<CryptoError> for AppError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Config(m) => AppError::Config(m),
            CryptoError::SelfPair => AppError::BadRequest("sender and recipient are the same user".into()),
            CryptoError::InvalidChannel(name) => {
                AppError::BadRequest(format!("invalid channel name: {name}"))
            }
            CryptoError::InvalidIdentifier(m) => AppError::BadRequest(m),
            other => AppError::Encryption(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), 400),
            (AppError::Unauthorized("x".into()), 401),
            (AppError::Forbidden("x".into()), 403),
            (AppError::NotFound("x".into()), 404),
            (AppError::Conflict("x".into()), 409),
            (AppError::Backend("x".into()), 500),
            (AppError::Upstream("x".into()), 502),
            (AppError::Encryption("x".into()), 500),
            (AppError::Internal("x".into()), 500),
            (AppError::Config("x".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
        }
    }

    #[actix_web::test]
    async fn test_error_body_shape() {
        let resp = AppError::Conflict("friendship already exists".into()).error_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "conflict");
        assert_eq!(json["message"], "friendship already exists");
    }

    #[test]
    fn test_crypto_error_mapping() {
        assert!(matches!(
            AppError::from(CryptoError::SelfPair),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(CryptoError::InvalidChannel("x".into())),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(CryptoError::Decode("x".into())),
            AppError::Encryption(_)
        ));
    }

    #[test]
    fn test_identity_error_mapping() {
        assert!(matches!(
            AppError::from(IdentityError::InvalidSession("expired".into())),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(IdentityError::Http("timeout".into())),
            AppError::Upstream(_)
        ));
    }
}
