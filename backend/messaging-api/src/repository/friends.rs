use crate::clients::{GraphqlBackend, HasuraError};
use crate::models::FriendshipRow;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const FIND_FRIENDSHIP: &str = r#"
    query CheckFriendship($first_id: String!, $second_id: String!) {
        friends(where: {user_id: {_eq: $first_id}, friend_id: {_eq: $second_id}}) {
            id
            user_id
            friend_id
            to_accept
            status
        }
    }
"#;

const INSERT_FRIENDSHIP: &str = r#"
    mutation AddFriend($user_id: String!, $friend_id: String!, $status: String!, $to_accept: String!) {
        insert_friends_one(object: {user_id: $user_id, friend_id: $friend_id, status: $status, to_accept: $to_accept}) {
            id
        }
    }
"#;

const UPDATE_STATUS: &str = r#"
    mutation UpdateFriendStatus($id: bigint!, $status: String!) {
        update_friends_by_pk(pk_columns: {id: $id}, _set: {status: $status}) {
            id
        }
    }
"#;

const DELETE_FRIENDSHIP: &str = r#"
    mutation DeleteFriendship($first_id: String!, $second_id: String!) {
        delete_friends(where: {user_id: {_eq: $first_id}, friend_id: {_eq: $second_id}}) {
            affected_rows
        }
    }
"#;

const ACCEPTED_FRIENDS: &str = r#"
    query GetFriends($userID: String!) {
        friends1: friends(where: {user_id: {_eq: $userID}, status: {_eq: "accepted"}}) {
            friend_id
        }
        friends2: friends(where: {friend_id: {_eq: $userID}, status: {_eq: "accepted"}}) {
            user_id
        }
    }
"#;

const PENDING_REQUESTS: &str = r#"
    query GetRequests($userID: String!) {
        friends1: friends(where: {user_id: {_eq: $userID}, status: {_eq: "pending"}, to_accept: {_eq: $userID}}) {
            friend_id
        }
        friends2: friends(where: {friend_id: {_eq: $userID}, status: {_eq: "pending"}, to_accept: {_eq: $userID}}) {
            user_id
        }
    }
"#;

#[derive(Deserialize)]
struct FriendsData {
    friends: Vec<FriendshipRow>,
}

#[derive(Deserialize)]
struct FriendIdRow {
    friend_id: String,
}

#[derive(Deserialize)]
struct UserIdRow {
    user_id: String,
}

/// Rows where the user is the first id, and rows where they are the second.
#[derive(Deserialize)]
struct BothDirections {
    #[serde(default)]
    friends1: Vec<FriendIdRow>,
    #[serde(default)]
    friends2: Vec<UserIdRow>,
}

impl BothDirections {
    fn other_ids(self) -> Vec<String> {
        self.friends1
            .into_iter()
            .map(|r| r.friend_id)
            .chain(self.friends2.into_iter().map(|r| r.user_id))
            .collect()
    }
}

#[derive(Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

#[derive(Deserialize)]
struct DeleteFriendsData {
    delete_friends: AffectedRows,
}

#[derive(Clone)]
pub struct FriendRepository {
    gql: Arc<dyn GraphqlBackend>,
}

impl FriendRepository {
    pub fn new(gql: Arc<dyn GraphqlBackend>) -> Self {
        Self { gql }
    }

    /// The row for an already-canonical pair.
    pub async fn find(&self, first: &str, second: &str) -> Result<Option<FriendshipRow>, HasuraError> {
        let data: FriendsData = self
            .gql
            .query(
                FIND_FRIENDSHIP,
                json!({ "first_id": first, "second_id": second }),
            )
            .await?;
        Ok(data.friends.into_iter().next())
    }

    pub async fn insert(
        &self,
        user_id: &str,
        friend_id: &str,
        status: &str,
        to_accept: &str,
    ) -> Result<(), HasuraError> {
        self.gql
            .execute(
                INSERT_FRIENDSHIP,
                json!({
                    "user_id": user_id,
                    "friend_id": friend_id,
                    "status": status,
                    "to_accept": to_accept,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: &Value, status: &str) -> Result<(), HasuraError> {
        self.gql
            .execute(UPDATE_STATUS, json!({ "id": id, "status": status }))
            .await?;
        Ok(())
    }

    /// Delete the row for an already-canonical pair; returns affected rows.
    pub async fn delete(&self, first: &str, second: &str) -> Result<u64, HasuraError> {
        let data: DeleteFriendsData = self
            .gql
            .query(
                DELETE_FRIENDSHIP,
                json!({ "first_id": first, "second_id": second }),
            )
            .await?;
        Ok(data.delete_friends.affected_rows)
    }

    /// Ids of everyone with an accepted friendship with `user_id`.
    pub async fn accepted_ids(&self, user_id: &str) -> Result<Vec<String>, HasuraError> {
        let data: BothDirections = self
            .gql
            .query(ACCEPTED_FRIENDS, json!({ "userID": user_id }))
            .await?;
        Ok(data.other_ids())
    }

    /// Ids of everyone with a pending request waiting on `user_id`.
    pub async fn pending_request_ids(&self, user_id: &str) -> Result<Vec<String>, HasuraError> {
        let data: BothDirections = self
            .gql
            .query(PENDING_REQUESTS, json!({ "userID": user_id }))
            .await?;
        Ok(data.other_ids())
    }
}
