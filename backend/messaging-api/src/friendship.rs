//! Friend-request state machine.
//!
//! One row per canonical pair. States: no row, `pending` (waiting on the user
//! named in `to_accept`), `accepted`. A request toward someone who already
//! asked you accepts their request instead of creating a second one.

use crate::error::AppError;
use crate::models::{FriendshipRow, STATUS_ACCEPTED, STATUS_PENDING};
use crypto_core::canonical_pair;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FriendshipError {
    #[error("cannot add self as friend")]
    SelfRequest,

    #[error("friendship already exists")]
    AlreadyFriends,

    #[error("friend request already sent")]
    AlreadyRequested,
}

impl From<FriendshipError> for AppError {
    fn from(e: FriendshipError) -> Self {
        match e {
            FriendshipError::SelfRequest => AppError::BadRequest(e.to_string()),
            FriendshipError::AlreadyFriends | FriendshipError::AlreadyRequested => {
                AppError::Conflict(e.to_string())
            }
        }
    }
}

/// What to write for a friend request.
#[derive(Debug, Clone, PartialEq)]
pub enum FriendAction {
    /// Insert a new canonical row.
    Insert {
        user_id: String,
        friend_id: String,
        status: &'static str,
        to_accept: String,
    },
    /// Flip the existing row to `accepted`.
    Accept { id: Value },
}

/// Decide the transition for `requester` asking `target`, given the current
/// canonical row if any.
pub fn plan_request(
    requester: &str,
    target: &str,
    existing: Option<&FriendshipRow>,
) -> Result<FriendAction, FriendshipError> {
    let (first, second) =
        canonical_pair(requester, target).map_err(|_| FriendshipError::SelfRequest)?;

    if let Some(row) = existing {
        if row.status == STATUS_ACCEPTED {
            return Err(FriendshipError::AlreadyFriends);
        }
        if row.status == STATUS_PENDING && row.to_accept == target {
            return Err(FriendshipError::AlreadyRequested);
        }
        if row.status == STATUS_PENDING && row.to_accept == requester {
            return Ok(FriendAction::Accept { id: row.id.clone() });
        }
    }

    // Rows in any other state fall through to an insert.
    Ok(FriendAction::Insert {
        user_id: first.to_string(),
        friend_id: second.to_string(),
        status: STATUS_PENDING,
        to_accept: target.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(status: &str, to_accept: &str) -> FriendshipRow {
        FriendshipRow {
            id: json!(42),
            user_id: "alice".into(),
            friend_id: "bob".into(),
            status: status.into(),
            to_accept: to_accept.into(),
        }
    }

    #[test]
    fn test_no_row_inserts_pending_canonical_row() {
        let action = plan_request("bob", "alice", None).unwrap();
        assert_eq!(
            action,
            FriendAction::Insert {
                user_id: "alice".into(),
                friend_id: "bob".into(),
                status: "pending",
                to_accept: "alice".into(),
            }
        );
    }

    #[test]
    fn test_accepted_row_conflicts() {
        let existing = row("accepted", "bob");
        assert_eq!(
            plan_request("alice", "bob", Some(&existing)),
            Err(FriendshipError::AlreadyFriends)
        );
        assert_eq!(
            plan_request("bob", "alice", Some(&existing)),
            Err(FriendshipError::AlreadyFriends)
        );
    }

    #[test]
    fn test_repeat_request_conflicts() {
        let existing = row("pending", "bob");
        assert_eq!(
            plan_request("alice", "bob", Some(&existing)),
            Err(FriendshipError::AlreadyRequested)
        );
    }

    #[test]
    fn test_counter_request_accepts() {
        let existing = row("pending", "bob");
        assert_eq!(
            plan_request("bob", "alice", Some(&existing)),
            Ok(FriendAction::Accept { id: json!(42) })
        );
    }

    #[test]
    fn test_unknown_status_falls_through_to_insert() {
        let existing = row("blocked", "bob");
        assert!(matches!(
            plan_request("alice", "bob", Some(&existing)),
            Ok(FriendAction::Insert { .. })
        ));
    }

    #[test]
    fn test_self_request_rejected() {
        assert_eq!(
            plan_request("alice", "alice", None),
            Err(FriendshipError::SelfRequest)
        );
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            AppError::from(FriendshipError::SelfRequest),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            AppError::from(FriendshipError::AlreadyRequested),
            AppError::Conflict(_)
        ));
    }
}
