//! Unread-message notifications: one row per user holding the ids of users
//! with messages they have not opened yet.

use crate::clients::{GraphqlBackend, HasuraError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const SENDERS: &str = r#"
    query GetNotifications($userID: String!) {
        notifications(where: {user: {_eq: $userID}}) {
            from_users
        }
    }
"#;

const UPSERT_SENDERS: &str = r#"
    mutation UpsertNotifications($userID: String!, $fromUsers: [String!]!) {
        insert_notifications(
            objects: {user: $userID, from_users: $fromUsers},
            on_conflict: {constraint: notifications_pkey, update_columns: [from_users]}
        ) {
            affected_rows
        }
    }
"#;

const SET_SENDERS: &str = r#"
    mutation UpdateNotifications($userID: String!, $fromUsers: [String!]!) {
        update_notifications(where: {user: {_eq: $userID}}, _set: {from_users: $fromUsers}) {
            affected_rows
        }
    }
"#;

#[derive(Deserialize)]
struct NotificationRow {
    #[serde(default)]
    from_users: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct NotificationsData {
    notifications: Vec<NotificationRow>,
}

#[derive(Clone)]
pub struct NotificationRepository {
    gql: Arc<dyn GraphqlBackend>,
}

impl NotificationRepository {
    pub fn new(gql: Arc<dyn GraphqlBackend>) -> Self {
        Self { gql }
    }

    /// Ids of users with unread messages for `user_id`.
    pub async fn senders(&self, user_id: &str) -> Result<Vec<String>, HasuraError> {
        let data: NotificationsData = self.gql.query(SENDERS, json!({ "userID": user_id })).await?;
        Ok(data
            .notifications
            .into_iter()
            .flat_map(|row| row.from_users.unwrap_or_default())
            .collect())
    }

    /// Record `sender_id` as having unread messages for `user_id`.
    pub async fn add_sender(&self, user_id: &str, sender_id: &str) -> Result<(), HasuraError> {
        let mut senders = self.senders(user_id).await?;
        if senders.iter().any(|s| s == sender_id) {
            return Ok(());
        }
        senders.push(sender_id.to_string());

        self.gql
            .execute(
                UPSERT_SENDERS,
                json!({ "userID": user_id, "fromUsers": senders }),
            )
            .await?;
        Ok(())
    }

    /// Clear `sender_id` from the unread list of `user_id`.
    pub async fn remove_sender(&self, user_id: &str, sender_id: &str) -> Result<(), HasuraError> {
        let senders = self.senders(user_id).await?;
        if !senders.iter().any(|s| s == sender_id) {
            return Ok(());
        }
        let remaining: Vec<String> = senders.into_iter().filter(|s| s != sender_id).collect();

        self.gql
            .execute(
                SET_SENDERS,
                json!({ "userID": user_id, "fromUsers": remaining }),
            )
            .await?;
        Ok(())
    }
}
