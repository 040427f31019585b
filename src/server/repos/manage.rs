use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{CreateRepoRequest, OwnerResponse, RepoDetailsResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_id, validate_repo_name};
use crate::types::{Repo, RepoWithRequests};

pub async fn create_repo(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRepoRequest>,
) -> impl IntoResponse {
    validate_repo_name(&req.name)?;

    let now = Utc::now();
    let repo = Repo {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        owner_id: auth.id,
        srs_file: None,
        source_file: None,
        extraction: None,
        created_at: now,
        updated_at: now,
    };

    state.store.create_repo(&repo).map_err(|e| match e {
        Error::AlreadyExists => ApiError::bad_request("Repository name already exists"),
        other => other.into(),
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(repo))))
}

pub async fn my_repos(auth: AuthUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let repos = state
        .store
        .list_repos_for_user(&auth.id)
        .api_err("Failed to list repositories")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(repos)))
}

/// Same membership listing as `my_repos`, with each repository annotated
/// with its pending requests so the owner can build a requests inbox.
pub async fn my_repos_with_requests(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let repos = state
        .store
        .list_repos_for_user(&auth.id)
        .api_err("Failed to list repositories")?;

    let mut annotated = Vec::with_capacity(repos.len());
    for repo in repos {
        let requests = state
            .store
            .list_access_requests(&repo.id)
            .api_err("Failed to list access requests")?;
        annotated.push(RepoWithRequests { repo, requests });
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(annotated)))
}

pub async fn all_repos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let repos = state
        .store
        .list_repos()
        .api_err("Failed to list repositories")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(repos)))
}

pub async fn repo_owner(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    validate_id(&id, "repository")?;

    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let owner = state
        .store
        .get_user(&repo.owner_id)
        .api_err("Failed to get owner")?
        .or_not_found("Owner details not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(OwnerResponse {
        id: owner.id,
        name: owner.username,
        email: owner.email,
        organization: owner.organization,
    })))
}

pub async fn repo_details(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let commits = state
        .store
        .count_history(&repo.id)
        .api_err("Failed to count uploads")?;

    let extracted_report = format!("/extracted/{}/latest_extracted.csv", repo.name);

    Ok::<_, ApiError>(Json(ApiResponse::success(RepoDetailsResponse {
        repo,
        commits,
        extracted_report,
    })))
}
