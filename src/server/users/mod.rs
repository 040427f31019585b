mod accounts;
mod profile;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route("/profile", delete(profile::delete_profile))
        .route("/{id}", get(profile::get_user))
}
