use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExtractionStatus, FileKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public identity fields, used wherever another user's record is embedded
/// in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srs_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoWithOwner {
    #[serde(flatten)]
    pub repo: Repo,
    pub owner: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoWithRequests {
    #[serde(flatten)]
    pub repo: Repo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<UserSummary>,
}

/// One entry in a repository's upload history. Entries are append-only and
/// never rewritten; `action` carries the display label recorded at upload
/// time ("Uploaded SRS", "Uploaded Source Code", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: i64,
    pub user: UserSummary,
    pub kind: FileKind,
    pub action: String,
    pub file: String,
    pub created_at: DateTime<Utc>,
}
