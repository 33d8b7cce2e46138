use super::require;
use crate::error::AppError;
use crate::repository::{FriendRepository, NotificationRepository, UserRepository};
use crate::services::FriendService;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct FriendsQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestsQuery {
    pub user_id: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendQuery {
    pub user_id: Option<String>,
    pub friend_email: Option<String>,
    pub operation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFriendQuery {
    pub user_id: Option<String>,
    pub friend_email: Option<String>,
}

/// GET /api/getfriends?user_id=
///
/// Accepted friends in either row direction, as user cards.
#[get("/getfriends")]
pub async fn get_friends(
    state: web::Data<AppState>,
    query: web::Query<FriendsQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;

    let users = UserRepository::new(state.graphql.clone());
    users.touch_best_effort(user_id).await;

    let ids = FriendRepository::new(state.graphql.clone())
        .accepted_ids(user_id)
        .await?;
    Ok(HttpResponse::Ok().json(users.cards(&ids).await?))
}

/// GET /api/getrequests?user_id=&kind=friend|request|notifications
#[get("/getrequests")]
pub async fn get_requests(
    state: web::Data<AppState>,
    query: web::Query<RequestsQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;
    let kind = require(&query.kind, "kind")?;

    let users = UserRepository::new(state.graphql.clone());
    let friends = FriendRepository::new(state.graphql.clone());

    let ids = match kind {
        "friend" => friends.accepted_ids(user_id).await?,
        "request" => friends.pending_request_ids(user_id).await?,
        "notifications" => {
            let senders = NotificationRepository::new(state.graphql.clone())
                .senders(user_id)
                .await?;
            return Ok(HttpResponse::Ok().json(senders));
        }
        other => {
            return Err(AppError::BadRequest(format!("invalid kind: {other}")));
        }
    };

    users.touch_best_effort(user_id).await;
    Ok(HttpResponse::Ok().json(users.profiles(&ids).await?))
}

/// GET /api/addfriend?user_id=&friend_email=&operation=add|remove
#[get("/addfriend")]
pub async fn add_friend(
    state: web::Data<AppState>,
    query: web::Query<AddFriendQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;
    let friend_email = require(&query.friend_email, "friend_email")?;
    let operation = require(&query.operation, "operation")?;
    if operation != "add" && operation != "remove" {
        return Err(AppError::BadRequest(format!("invalid operation: {operation}")));
    }

    UserRepository::new(state.graphql.clone())
        .touch_best_effort(user_id)
        .await;

    let service = FriendService::new(state.graphql.clone());
    let friend_id = service.resolve_email(friend_email).await?;

    if operation == "add" {
        service.request(user_id, &friend_id).await?;
    } else {
        service.remove(user_id, &friend_id).await?;
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Friend operation successfully completed"
    })))
}

/// GET /api/deletefriend?user_id=&friend_email=
#[get("/deletefriend")]
pub async fn delete_friend(
    state: web::Data<AppState>,
    query: web::Query<DeleteFriendQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;
    let friend_email = require(&query.friend_email, "friend_email")?;

    UserRepository::new(state.graphql.clone())
        .touch_best_effort(user_id)
        .await;

    let service = FriendService::new(state.graphql.clone());
    let friend_id = service.resolve_email(friend_email).await?;
    service.remove(user_id, &friend_id).await?;

    Ok(HttpResponse::Created().json(json!({ "message": "Friend removed successfully" })))
}
