use serde::{Deserialize, Serialize};

use crate::access::Decision;
use crate::types::{Repo, UploadRecord, User};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRepoRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct HandleRequestRequest {
    pub user_id: String,
    pub decision: Decision,
}

/// Public owner record for a repository, organization included.
#[derive(Debug, Serialize)]
pub struct OwnerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepoDetailsResponse {
    #[serde(flatten)]
    pub repo: Repo,
    /// Total upload count across both histories.
    pub commits: i64,
    pub extracted_report: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub id: String,
    pub name: String,
    pub srs_history: Vec<UploadRecord>,
    pub source_history: Vec<UploadRecord>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub repo: Repo,
    pub extracted_report: String,
}
