use crate::clients::{GraphqlBackend, HasuraError};
use crate::models::StoredMessage;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const INSERT_MESSAGE: &str = r#"
    mutation InsertMessage($senderID: String!, $recipientID: String!, $content: String!, $key: String!, $createdAt: timestamptz!) {
        insert_messages(objects: {sender_id: $senderID, recipient_id: $recipientID, encrypted_content: $content, key: $key, created_at: $createdAt}) {
            affected_rows
        }
    }
"#;

const CONVERSATION: &str = r#"
    query GetMessages($userID: String!, $friendID: String!) {
        messages(
            where: {
                _or: [
                    {sender_id: {_eq: $userID}, recipient_id: {_eq: $friendID}},
                    {sender_id: {_eq: $friendID}, recipient_id: {_eq: $userID}}
                ]
            },
            order_by: {created_at: asc}
        ) {
            id
            sender_id
            recipient_id
            encrypted_content
            created_at
            key
        }
    }
"#;

#[derive(Deserialize)]
struct MessagesData {
    messages: Vec<StoredMessage>,
}

/// A message ready to store: hex ciphertext plus hex IV.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub sender_id: &'a str,
    pub recipient_id: &'a str,
    pub ciphertext_hex: &'a str,
    pub iv_hex: &'a str,
    pub created_at: &'a str,
}

#[derive(Clone)]
pub struct MessageRepository {
    gql: Arc<dyn GraphqlBackend>,
}

impl MessageRepository {
    pub fn new(gql: Arc<dyn GraphqlBackend>) -> Self {
        Self { gql }
    }

    pub async fn insert(&self, message: &NewMessage<'_>) -> Result<(), HasuraError> {
        self.gql
            .execute(
                INSERT_MESSAGE,
                json!({
                    "senderID": message.sender_id,
                    "recipientID": message.recipient_id,
                    "content": message.ciphertext_hex,
                    "key": message.iv_hex,
                    "createdAt": message.created_at,
                }),
            )
            .await?;
        Ok(())
    }

    /// Messages in both directions between two users, oldest first.
    pub async fn conversation(
        &self,
        user_id: &str,
        friend_id: &str,
    ) -> Result<Vec<StoredMessage>, HasuraError> {
        let data: MessagesData = self
            .gql
            .query(
                CONVERSATION,
                json!({ "userID": user_id, "friendID": friend_id }),
            )
            .await?;
        Ok(data.messages)
    }
}
