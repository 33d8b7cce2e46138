pub mod friends;
pub mod messages;
pub mod realtime;
pub mod users;
pub mod webhooks;

use crate::error::AppError;
use actix_web::{web, HttpResponse};

/// Register every API route under `/api`, plus `/health`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .service(users::update_seen)
            .service(users::get_users)
            .service(users::get_user)
            .service(users::get_user_info)
            .service(users::update_user)
            .service(friends::get_friends)
            .service(friends::get_requests)
            .service(friends::add_friend)
            .service(friends::delete_friend)
            .service(messages::send_message)
            .service(messages::get_messages)
            .service(messages::new_message)
            .service(realtime::pusher_auth)
            .service(webhooks::user_created)
            .service(webhooks::user_deleted),
    );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// A required, non-blank request parameter.
pub(crate) fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("missing {name} parameter")))
}
