use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{AuthResponse, LoginRequest, SignupRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{validate_email, validate_password, validate_username};
use crate::types::User;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> impl IntoResponse {
    validate_username(&req.username)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password).api_err("Failed to hash password")?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        email: req.email,
        password_hash,
        organization: req.organization,
        created_at: now,
        updated_at: now,
    };

    state.store.create_user(&user).map_err(|e| match e {
        Error::AlreadyExists => ApiError::bad_request("Email already in use"),
        other => other.into(),
    })?;

    let token = state
        .tokens
        .sign(&user.id, &user.email)
        .api_err("Failed to sign token")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthResponse { token, user })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    // One message for both failure modes so the endpoint does not reveal
    // which emails have accounts
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .store
        .get_user_by_email(&req.email)
        .api_err("Failed to look up user")?
        .ok_or_else(invalid)?;

    let matches = verify_password(&req.password, &user.password_hash)
        .api_err("Failed to verify password")?;
    if !matches {
        return Err(invalid());
    }

    let token = state
        .tokens
        .sign(&user.id, &user.email)
        .api_err("Failed to sign token")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AuthResponse { token, user })))
}
