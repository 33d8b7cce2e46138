//! Session authentication as a request extractor.
//!
//! Handlers that take a [`SessionUser`] only run for requests carrying a valid
//! `Authorization: Bearer <session token>` whose subject still exists at the
//! identity provider.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::{http::header, web, Error, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// The caller, as established by the identity provider.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: String,
}

impl SessionUser {
    /// Reject requests whose claimed id is not the session subject.
    pub fn require_self(&self, claimed_id: &str) -> Result<(), AppError> {
        if self.id != claimed_id {
            debug!(subject = %self.id, claimed_id, "session subject mismatch");
            return Err(AppError::Forbidden(
                "session subject does not match request id".into(),
            ));
        }
        Ok(())
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
            let token = token.ok_or_else(|| AppError::Unauthorized("session not found".into()))?;

            let subject = state
                .identity
                .verify_session(&token)
                .await
                .map_err(AppError::from)?;
            let user = state
                .identity
                .get_user(&subject)
                .await
                .map_err(AppError::from)?;

            Ok(SessionUser { id: user.id })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def"));

        let bare = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&bare).as_deref(), Some("abc.def"));

        let empty = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(&empty), None);

        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }

    #[test]
    fn test_require_self() {
        let user = SessionUser { id: "user_1".into() };
        assert!(user.require_self("user_1").is_ok());
        assert!(matches!(
            user.require_self("user_2"),
            Err(AppError::Forbidden(_))
        ));
    }
}
