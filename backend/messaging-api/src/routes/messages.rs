use super::require;
use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::models::StoredMessage;
use crate::services::MessageService;
use crate::state::AppState;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub sender_id: String,
    pub receiver_email: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub caller_id: String,
    pub callee_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Body of `sendmessage`: a chat message, or failing that a call request.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SendRequest {
    Message(ChatMessageRequest),
    Call(CallRequest),
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user_id: Option<String>,
    pub friend_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventData {
    new: StoredMessage,
}

#[derive(Debug, Deserialize)]
struct EventBody {
    data: EventData,
}

/// Insert trigger from the GraphQL backend, either the full event envelope or
/// just the new row.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NewMessageEvent {
    Envelope { event: EventBody },
    Row { new: StoredMessage },
}

impl NewMessageEvent {
    fn into_message(self) -> StoredMessage {
        match self {
            NewMessageEvent::Envelope { event } => event.data.new,
            NewMessageEvent::Row { new } => new,
        }
    }
}

fn non_empty(fields: &[(&str, &str)]) -> Result<(), AppError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(AppError::BadRequest(format!("missing {name}"))),
        None => Ok(()),
    }
}

/// POST /api/sendmessage
#[post("/sendmessage")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: SessionUser,
    body: web::Json<SendRequest>,
) -> Result<HttpResponse, AppError> {
    let service = MessageService::new(&state);

    match body.into_inner() {
        SendRequest::Message(msg) => {
            non_empty(&[
                ("sender_id", msg.sender_id.as_str()),
                ("receiver_email", msg.receiver_email.as_str()),
                ("content", msg.content.as_str()),
            ])?;
            user.require_self(&msg.sender_id)?;

            service
                .send(&msg.sender_id, &msg.receiver_email, &msg.content)
                .await?;
            Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
        }
        SendRequest::Call(call) => {
            non_empty(&[
                ("caller_id", call.caller_id.as_str()),
                ("callee_id", call.callee_id.as_str()),
            ])?;
            user.require_self(&call.caller_id)?;

            service
                .start_call(&call.caller_id, &call.callee_id, &call.kind)
                .await?;
            Ok(HttpResponse::Ok().json(json!({ "status": "call request sent" })))
        }
    }
}

/// GET /api/getmessages?user_id=&friend_id=
#[get("/getmessages")]
pub async fn get_messages(
    state: web::Data<AppState>,
    user: SessionUser,
    query: web::Query<ConversationQuery>,
) -> Result<HttpResponse, AppError> {
    let user_id = require(&query.user_id, "user_id")?;
    let friend_id = require(&query.friend_id, "friend_id")?;
    user.require_self(user_id)?;

    let messages = MessageService::new(&state)
        .conversation(user_id, friend_id)
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// POST /api/newmessage: relay a row inserted in the backend.
#[post("/newmessage")]
pub async fn new_message(
    state: web::Data<AppState>,
    body: web::Json<NewMessageEvent>,
) -> Result<HttpResponse, AppError> {
    let message = body.into_inner().into_message();
    MessageService::new(&state).relay_stored(&message).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}
