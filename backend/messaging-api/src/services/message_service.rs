//! # Message Service
//!
//! Message bodies are encrypted with the *sender's* derived key before they
//! reach the GraphQL backend, and decrypted with the sender's key on read.
//! Live delivery on `private-chat-{a}-{b}` carries the plaintext; the
//! backend-triggered relay on `chat-{a}-{b}` carries the stored ciphertext.

use crate::clients::Broadcaster;
use crate::error::{AppError, AppResult};
use crate::models::{now_timestamp, StoredMessage};
use crate::repository::{MessageRepository, NewMessage, NotificationRepository, UserRepository};
use crate::state::AppState;
use crypto_core::{
    call_channel, chat_channel, decrypt, encrypt, notification_channel, MessageSecret,
    CHAT_CHANNEL_PREFIX, PRIVATE_CHAT_CHANNEL_PREFIX,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const EVENT_NEW_MESSAGE: &str = "new-message";
pub const EVENT_NEW_NOTIFICATION: &str = "new-notification";
pub const EVENT_INCOMING_CALL: &str = "incoming-call";

pub struct MessageService {
    secret: MessageSecret,
    broadcaster: Arc<dyn Broadcaster>,
    users: UserRepository,
    messages: MessageRepository,
    notifications: NotificationRepository,
}

impl MessageService {
    pub fn new(state: &AppState) -> Self {
        Self {
            secret: state.message_secret.clone(),
            broadcaster: state.broadcaster.clone(),
            users: UserRepository::new(state.graphql.clone()),
            messages: MessageRepository::new(state.graphql.clone()),
            notifications: NotificationRepository::new(state.graphql.clone()),
        }
    }

    /// Broadcast failures never fail the request.
    async fn broadcast_best_effort(&self, channel: &str, event: &str, payload: Value) {
        if let Err(e) = self.broadcaster.broadcast(channel, event, &payload).await {
            warn!(channel, event, error = %e, "broadcast failed");
        }
    }

    /// Deliver `content` from `sender_id` to the user registered under
    /// `receiver_email`, store it encrypted, and flag it as unread.
    pub async fn send(&self, sender_id: &str, receiver_email: &str, content: &str) -> AppResult<()> {
        self.users.touch_best_effort(sender_id).await;

        let receiver_id = self.users.id_by_email(receiver_email).await?.ok_or_else(|| {
            AppError::NotFound(format!("user with email {receiver_email} not found"))
        })?;
        let channel = chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, sender_id, &receiver_id)?;

        let key = self.secret.derive_key(sender_id)?;
        let encrypted = encrypt(content, &key);
        let created_at = now_timestamp();

        self.broadcast_best_effort(
            &channel,
            EVENT_NEW_MESSAGE,
            json!({
                "sender_id": sender_id,
                "recipient_id": receiver_id,
                "encrypted_content": content,
                "created_at": created_at,
            }),
        )
        .await;

        self.messages
            .insert(&NewMessage {
                sender_id,
                recipient_id: &receiver_id,
                ciphertext_hex: &encrypted.ciphertext_hex,
                iv_hex: &encrypted.iv_hex,
                created_at: &created_at,
            })
            .await?;

        self.notifications.add_sender(&receiver_id, sender_id).await?;
        self.broadcast_best_effort(
            &notification_channel(&receiver_id),
            EVENT_NEW_NOTIFICATION,
            json!({ "sender_id": sender_id }),
        )
        .await;

        info!(sender_id, receiver_id = %receiver_id, "message sent");
        Ok(())
    }

    /// Ring `callee_id` on their private call channel.
    pub async fn start_call(&self, caller_id: &str, callee_id: &str, kind: &str) -> AppResult<()> {
        if caller_id == callee_id {
            return Err(AppError::BadRequest("cannot call yourself".into()));
        }
        self.broadcast_best_effort(
            &call_channel(callee_id),
            EVENT_INCOMING_CALL,
            json!({ "caller_id": caller_id, "type": kind }),
        )
        .await;

        info!(caller_id, callee_id, "call request sent");
        Ok(())
    }

    /// Conversation between `user_id` and `friend_id`, oldest first, with
    /// bodies decrypted. Opening it clears `friend_id` from the unread list.
    pub async fn conversation(&self, user_id: &str, friend_id: &str) -> AppResult<Vec<StoredMessage>> {
        let messages = self.messages.conversation(user_id, friend_id).await?;

        if let Err(e) = self.notifications.remove_sender(user_id, friend_id).await {
            warn!(user_id, friend_id, error = %e, "failed to clear notification");
        }

        Ok(messages
            .into_iter()
            .map(|message| self.decrypt_stored(message))
            .collect())
    }

    /// Replace the ciphertext with plaintext; on failure leave it as stored.
    fn decrypt_stored(&self, mut message: StoredMessage) -> StoredMessage {
        let plaintext = self
            .secret
            .derive_key(&message.sender_id)
            .map_err(AppError::from)
            .and_then(|key| {
                decrypt(&message.encrypted_content, &message.key, &key).map_err(AppError::from)
            });

        match plaintext {
            Ok(plaintext) => message.encrypted_content = plaintext,
            Err(e) => warn!(message_id = %message.id, error = %e, "failed to decrypt message"),
        }
        message
    }

    /// Fan out a row inserted in the backend to both participants.
    pub async fn relay_stored(&self, message: &StoredMessage) -> AppResult<()> {
        let channel = chat_channel(CHAT_CHANNEL_PREFIX, &message.sender_id, &message.recipient_id)?;
        let payload = serde_json::to_value(message)
            .map_err(|e| AppError::Internal(format!("encode message: {e}")))?;

        self.broadcast_best_effort(&channel, EVENT_NEW_MESSAGE, payload).await;
        Ok(())
    }
}
