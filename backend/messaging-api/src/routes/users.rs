use super::require;
use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::models::ProfileUpdate;
use crate::repository::UserRepository;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const DEFAULT_OFFSET: i64 = 0;
const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetUserRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetUserInfoRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Parse a paging parameter, falling back to `default` when absent,
/// unparsable or negative.
fn page_param(value: &Option<String>, default: i64) -> i64 {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(default)
}

/// GET /api/updateseen?user_id=
#[get("/updateseen")]
pub async fn update_seen(
    state: web::Data<AppState>,
    query: web::Query<UserIdQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;

    let repo = UserRepository::new(state.graphql.clone());
    if !repo.touch(user_id).await? {
        return Err(AppError::NotFound(format!("user {user_id} not found")));
    }

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// GET /api/getusers?offset=&limit=
#[get("/getusers")]
pub async fn get_users(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let offset = page_param(&query.offset, DEFAULT_OFFSET);
    let limit = page_param(&query.limit, DEFAULT_LIMIT);

    let users = UserRepository::new(state.graphql.clone())
        .list(offset, limit)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /api/getuser: lookup by `id`, else by `email`.
#[post("/getuser")]
pub async fn get_user(
    state: web::Data<AppState>,
    body: web::Json<GetUserRequest>,
) -> Result<HttpResponse, AppError> {
    let repo = UserRepository::new(state.graphql.clone());

    let id = body.id.as_deref().filter(|v| !v.is_empty());
    let email = body.email.as_deref().filter(|v| !v.is_empty());

    let user = match (id, email) {
        (Some(id), _) => repo.find_by_id(id).await?,
        (None, Some(email)) => repo.find_by_email(email).await?,
        (None, None) => {
            return Err(AppError::BadRequest("either id or email is required".into()));
        }
    };

    let user = user.ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/getuserinfo
#[post("/getuserinfo")]
pub async fn get_user_info(
    state: web::Data<AppState>,
    body: web::Json<GetUserInfoRequest>,
) -> Result<HttpResponse, AppError> {
    let email = require(&body.email, "email")?;

    let user = UserRepository::new(state.graphql.clone())
        .info_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(HttpResponse::Ok().json(user))
}

/// POST /api/updateuser: callers may only edit their own profile.
#[post("/updateuser")]
pub async fn update_user(
    state: web::Data<AppState>,
    user: SessionUser,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    user.require_self(&body.id)?;

    let repo = UserRepository::new(state.graphql.clone());
    if !repo.update_profile(&body).await? {
        return Err(AppError::NotFound(format!("user {} not found", body.id)));
    }

    info!(user_id = %body.id, "profile updated");
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
