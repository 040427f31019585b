//! HTTP surface of the access-request workflow. Guards and transitions
//! live in [`crate::access`]; these handlers only resolve the repository
//! and translate workflow errors into responses.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::access::{self, Decision};
use crate::auth::AuthUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{HandleRequestRequest, MessageResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};

pub async fn request_access(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    access::request_access(state.store.as_ref(), &repo, &auth.id).map_err(ApiError::from)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(MessageResponse {
        message: "Access request sent".to_string(),
    })))
}

pub async fn handle_request(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<HandleRequestRequest>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    access::decide_request(state.store.as_ref(), &repo, &auth.id, &req.user_id, req.decision)
        .map_err(|e| match e {
            Error::Forbidden => {
                ApiError::forbidden("Only the repository owner can decide access requests")
            }
            Error::NotFound => ApiError::not_found("No pending request for that user"),
            other => other.into(),
        })?;

    let message = match req.decision {
        Decision::Approve => "User approved successfully",
        Decision::Reject => "User rejected successfully",
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(MessageResponse {
        message: message.to_string(),
    })))
}

pub async fn list_requests(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let pending =
        access::pending_requests(state.store.as_ref(), &repo, &auth.id).map_err(|e| match e {
            Error::Forbidden => {
                ApiError::forbidden("Only the repository owner can view access requests")
            }
            other => other.into(),
        })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pending)))
}
