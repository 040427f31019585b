use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::auth::{AuthUser, hash_password};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::UpdateProfileRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_email, validate_password, validate_username};
use crate::types::UserSummary;

pub async fn get_profile(auth: AuthUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&auth.id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn update_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    let mut user = state
        .store
        .get_user(&auth.id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    if let Some(username) = req.username {
        validate_username(&username)?;
        user.username = username;
    }
    if let Some(email) = req.email {
        validate_email(&email)?;
        user.email = email;
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        user.password_hash = hash_password(&password).api_err("Failed to hash password")?;
    }
    if let Some(organization) = req.organization {
        user.organization = Some(organization);
    }
    user.updated_at = Utc::now();

    state.store.update_user(&user).map_err(|e| match e {
        Error::AlreadyExists => ApiError::bad_request("Email already in use"),
        other => other.into(),
    })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_user(&auth.id)
        .api_err("Failed to delete user")?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Public identity lookup, no authentication. Never exposes credentials.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(UserSummary::from(user))))
}
