//! Access-request workflow: the one place that decides how a user becomes
//! a member of a repository they do not own.
//!
//! Per (user, repo) pair there are three states: outsider (neither set),
//! pending (in the request set), member. `request_access` moves outsider to
//! pending; `decide_request` moves pending to member or back to outsider.
//! The underlying store runs each transition as a single transaction, so
//! concurrent calls cannot produce duplicate entries or a user who is both
//! pending and a member.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Repo, UserSummary};

/// Owner verdict on a pending access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// Files an access request for `user_id` on `repo`.
///
/// Valid only for outsiders: a caller who is already a member or already
/// pending gets a Conflict and nothing changes.
pub fn request_access(store: &dyn Store, repo: &Repo, user_id: &str) -> Result<()> {
    store
        .add_access_request(&repo.id, user_id)
        .map_err(|e| match e {
            Error::AlreadyExists => Error::Conflict(
                "access already requested or user is already a member".to_string(),
            ),
            other => other,
        })
}

/// Applies the owner's decision to a pending request.
///
/// Only the repository owner may decide, and only a currently-pending user
/// can be decided on. The pending entry is removed on both branches;
/// approve additionally adds the user to the member set.
pub fn decide_request(
    store: &dyn Store,
    repo: &Repo,
    caller_id: &str,
    target_user_id: &str,
    decision: Decision,
) -> Result<()> {
    if repo.owner_id != caller_id {
        return Err(Error::Forbidden);
    }

    let resolved =
        store.resolve_access_request(&repo.id, target_user_id, decision == Decision::Approve)?;
    if !resolved {
        return Err(Error::NotFound);
    }
    Ok(())
}

/// Lists the users currently pending on a repository. Owner-only.
pub fn pending_requests(
    store: &dyn Store,
    repo: &Repo,
    caller_id: &str,
) -> Result<Vec<UserSummary>> {
    if repo.owner_id != caller_id {
        return Err(Error::Forbidden);
    }
    store.list_access_requests(&repo.id)
}
