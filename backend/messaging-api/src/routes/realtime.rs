use super::require;
use crate::error::AppError;
use crate::middleware::SessionUser;
use crate::state::AppState;
use actix_web::{post, web, HttpResponse};
use crypto_core::{parse_chat_channel, PRIVATE_CHAT_CHANNEL_PREFIX};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct ChannelAuthForm {
    pub channel_name: Option<String>,
    pub socket_id: Option<String>,
}

/// POST /api/pusherauth: sign a subscription to `private-chat-{a}-{b}` for
/// one of its two participants.
#[post("/pusherauth")]
pub async fn pusher_auth(
    state: web::Data<AppState>,
    user: SessionUser,
    form: web::Form<ChannelAuthForm>,
) -> Result<HttpResponse, AppError> {
    let channel = require(&form.channel_name, "channel_name")?;
    let socket_id = require(&form.socket_id, "socket_id")?;

    let (first, second) = parse_chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, channel)?;
    if user.id != first && user.id != second {
        warn!(user_id = %user.id, channel, "channel authorization denied");
        return Err(AppError::Forbidden("not a participant of this channel".into()));
    }

    let auth = state.broadcaster.authorize_channel(socket_id, channel).await?;
    Ok(HttpResponse::Ok().json(auth))
}
