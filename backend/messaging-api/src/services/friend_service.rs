use crate::clients::GraphqlBackend;
use crate::error::{AppError, AppResult};
use crate::friendship::{plan_request, FriendAction, FriendshipError};
use crate::models::STATUS_ACCEPTED;
use crate::repository::{FriendRepository, UserRepository};
use crypto_core::canonical_pair;
use std::sync::Arc;
use tracing::info;

pub struct FriendService {
    users: UserRepository,
    friends: FriendRepository,
}

impl FriendService {
    pub fn new(gql: Arc<dyn GraphqlBackend>) -> Self {
        Self {
            users: UserRepository::new(gql.clone()),
            friends: FriendRepository::new(gql),
        }
    }

    pub async fn resolve_email(&self, email: &str) -> AppResult<String> {
        self.users
            .id_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with email {email} not found")))
    }

    /// Send, repeat or accept a friend request from `requester` to `target`.
    pub async fn request(&self, requester: &str, target: &str) -> AppResult<()> {
        let (first, second) =
            canonical_pair(requester, target).map_err(|_| FriendshipError::SelfRequest)?;
        let existing = self.friends.find(first, second).await?;

        match plan_request(requester, target, existing.as_ref())? {
            FriendAction::Insert {
                user_id,
                friend_id,
                status,
                to_accept,
            } => {
                self.friends
                    .insert(&user_id, &friend_id, status, &to_accept)
                    .await?;
                info!(requester, target, "friend request created");
            }
            FriendAction::Accept { id } => {
                self.friends.set_status(&id, STATUS_ACCEPTED).await?;
                info!(requester, target, "friend request accepted");
            }
        }
        Ok(())
    }

    /// Delete the friendship row between two users in whatever state it is.
    pub async fn remove(&self, user_id: &str, other_id: &str) -> AppResult<()> {
        let (first, second) =
            canonical_pair(user_id, other_id).map_err(|_| FriendshipError::SelfRequest)?;

        if self.friends.delete(first, second).await? == 0 {
            return Err(AppError::NotFound("no friendship row found to delete".into()));
        }
        info!(user_id, other_id, "friendship removed");
        Ok(())
    }
}
