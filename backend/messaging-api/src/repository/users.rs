use crate::clients::{GraphqlBackend, HasuraError};
use crate::models::{now_timestamp, NewUser, ProfileUpdate, UserProfile};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const TOUCH_LAST_SEEN: &str = r#"
    mutation UpdateLastSeen($id: String!, $lastSeen: timestamptz!) {
        update_users_by_pk(pk_columns: {id: $id}, _set: {last_seen: $lastSeen}) {
            last_seen
        }
    }
"#;

const LIST_USERS: &str = r#"
    query GetUsers($offset: Int!, $limit: Int!) {
        users(offset: $offset, limit: $limit) {
            name
            email
            bio
            language
            specialty
            interests
            occupation
        }
    }
"#;

const USER_BY_ID: &str = r#"
    query GetUser($id: String!) {
        users_by_pk(id: $id) {
            name
            bio
            language
            specialty
            interests
            occupation
            profile_picture
        }
    }
"#;

const USER_BY_EMAIL: &str = r#"
    query GetUserByEmail($email: String!) {
        users(where: {email: {_eq: $email}}) {
            id
            name
            bio
            language
            specialty
            interests
            occupation
            profile_picture
        }
    }
"#;

const USER_INFO_BY_EMAIL: &str = r#"
    query GetUserInfo($email: String!) {
        users(where: {email: {_eq: $email}}) {
            id
            bio
            language
            specialty
            interests
            occupation
        }
    }
"#;

const USER_ID_BY_EMAIL: &str = r#"
    query GetUserIdByEmail($email: String!) {
        users(where: {email: {_eq: $email}}) {
            id
        }
    }
"#;

const USER_CARDS: &str = r#"
    query GetUserCards($userIDs: [String!]!) {
        users(where: {id: {_in: $userIDs}}) {
            name
            email
            profile_picture
            last_seen
        }
    }
"#;

const USER_PROFILES: &str = r#"
    query GetUserProfiles($userIDs: [String!]!) {
        users(where: {id: {_in: $userIDs}}) {
            id
            name
            email
            bio
            language
            specialty
            interests
            occupation
            profile_picture
            last_seen
        }
    }
"#;

const UPDATE_PROFILE: &str = r#"
    mutation UpdateUser($id: String!, $bio: String, $language: [String!], $specialty: String, $interests: [String!], $occupation: String, $lastSeen: timestamptz!) {
        update_users_by_pk(
            pk_columns: {id: $id},
            _set: {bio: $bio, language: $language, specialty: $specialty, interests: $interests, occupation: $occupation, last_seen: $lastSeen}
        ) {
            id
        }
    }
"#;

const INSERT_USER: &str = r#"
    mutation InsertUser($id: String!, $name: String, $email: String!) {
        insert_users_one(object: {id: $id, name: $name, email: $email}) {
            id
        }
    }
"#;

const DELETE_USER: &str = r#"
    mutation DeleteUser($id: String!) {
        delete_users(where: {id: {_eq: $id}}) {
            affected_rows
        }
    }
"#;

#[derive(Deserialize)]
struct UsersData {
    users: Vec<UserProfile>,
}

#[derive(Deserialize)]
struct UserByPkData {
    users_by_pk: Option<UserProfile>,
}

#[derive(Deserialize)]
struct UpdateByPkData {
    update_users_by_pk: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

#[derive(Deserialize)]
struct DeleteUsersData {
    delete_users: AffectedRows,
}

#[derive(Clone)]
pub struct UserRepository {
    gql: Arc<dyn GraphqlBackend>,
}

impl UserRepository {
    pub fn new(gql: Arc<dyn GraphqlBackend>) -> Self {
        Self { gql }
    }

    /// Set `last_seen` to now. Returns `false` when no such user exists.
    pub async fn touch(&self, user_id: &str) -> Result<bool, HasuraError> {
        let data: UpdateByPkData = self
            .gql
            .query(
                TOUCH_LAST_SEEN,
                json!({ "id": user_id, "lastSeen": now_timestamp() }),
            )
            .await?;
        Ok(data.update_users_by_pk.is_some())
    }

    /// [`touch`](Self::touch), logging instead of failing.
    pub async fn touch_best_effort(&self, user_id: &str) {
        if let Err(e) = self.touch(user_id).await {
            warn!(user_id, error = %e, "failed to update last_seen");
        }
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserProfile>, HasuraError> {
        let data: UsersData = self
            .gql
            .query(LIST_USERS, json!({ "offset": offset, "limit": limit }))
            .await?;
        Ok(data.users)
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, HasuraError> {
        let data: UserByPkData = self.gql.query(USER_BY_ID, json!({ "id": user_id })).await?;
        Ok(data.users_by_pk.map(|mut profile| {
            profile.id.get_or_insert_with(|| user_id.to_string());
            profile
        }))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, HasuraError> {
        let data: UsersData = self.gql.query(USER_BY_EMAIL, json!({ "email": email })).await?;
        Ok(data.users.into_iter().next())
    }

    pub async fn info_by_email(&self, email: &str) -> Result<Option<UserProfile>, HasuraError> {
        let data: UsersData = self
            .gql
            .query(USER_INFO_BY_EMAIL, json!({ "email": email }))
            .await?;
        Ok(data.users.into_iter().next())
    }

    pub async fn id_by_email(&self, email: &str) -> Result<Option<String>, HasuraError> {
        let data: UsersData = self
            .gql
            .query(USER_ID_BY_EMAIL, json!({ "email": email }))
            .await?;
        Ok(data.users.into_iter().find_map(|u| u.id))
    }

    /// Name, email, picture and last-seen for each id.
    pub async fn cards(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, HasuraError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: UsersData = self
            .gql
            .query(USER_CARDS, json!({ "userIDs": user_ids }))
            .await?;
        Ok(data.users)
    }

    pub async fn profiles(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, HasuraError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let data: UsersData = self
            .gql
            .query(USER_PROFILES, json!({ "userIDs": user_ids }))
            .await?;
        Ok(data.users)
    }

    /// Returns `false` when no such user exists.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<bool, HasuraError> {
        let data: UpdateByPkData = self
            .gql
            .query(
                UPDATE_PROFILE,
                json!({
                    "id": update.id,
                    "bio": update.bio,
                    "language": update.language,
                    "specialty": update.specialty,
                    "interests": update.interests,
                    "occupation": update.occupation,
                    "lastSeen": now_timestamp(),
                }),
            )
            .await?;
        Ok(data.update_users_by_pk.is_some())
    }

    pub async fn insert(&self, user: &NewUser) -> Result<(), HasuraError> {
        self.gql
            .execute(
                INSERT_USER,
                json!({ "id": user.id, "name": user.name, "email": user.email }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str) -> Result<u64, HasuraError> {
        let data: DeleteUsersData = self.gql.query(DELETE_USER, json!({ "id": user_id })).await?;
        Ok(data.delete_users.affected_rows)
    }
}
