mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Repo operations. create_repo also inserts the owner's membership row.
    fn create_repo(&self, repo: &Repo) -> Result<()>;
    fn get_repo(&self, id: &str) -> Result<Option<Repo>>;
    fn get_repo_by_name(&self, name: &str) -> Result<Option<Repo>>;
    fn list_repos(&self) -> Result<Vec<RepoWithOwner>>;
    fn list_repos_for_user(&self, user_id: &str) -> Result<Vec<Repo>>;
    fn update_repo_file(&self, id: &str, kind: FileKind, file: &str) -> Result<()>;
    fn update_extraction_status(&self, id: &str, status: ExtractionStatus) -> Result<()>;

    // Membership and access requests. The request transitions run as single
    // transactions so their guards cannot race with each other.
    fn is_member(&self, repo_id: &str, user_id: &str) -> Result<bool>;
    fn add_access_request(&self, repo_id: &str, user_id: &str) -> Result<()>;
    fn resolve_access_request(&self, repo_id: &str, user_id: &str, approve: bool) -> Result<bool>;
    fn list_access_requests(&self, repo_id: &str) -> Result<Vec<UserSummary>>;

    // Upload history (append-only)
    fn append_history(
        &self,
        repo_id: &str,
        user_id: &str,
        kind: FileKind,
        action: &str,
        file: &str,
    ) -> Result<i64>;
    fn list_history(&self, repo_id: &str, kind: FileKind) -> Result<Vec<UploadRecord>>;
    fn count_history(&self, repo_id: &str) -> Result<i64>;

    fn close(&self) -> Result<()>;
}
