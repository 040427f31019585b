mod extracted;
mod manage;
mod requests;
mod uploads;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn repos_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(manage::create_repo))
        .route("/my-repos", get(manage::my_repos))
        .route("/myrepos", get(manage::my_repos_with_requests))
        .route("/all", get(manage::all_repos))
        .route("/owner/{id}", get(manage::repo_owner))
        .route("/{id}/details", get(manage::repo_details))
        .route("/{id}/request-access", post(requests::request_access))
        .route("/{id}/handle-request", post(requests::handle_request))
        .route("/{id}/requests", get(requests::list_requests))
        .route("/{id}/upload", post(uploads::upload_file))
        .route("/{id}/history", get(uploads::repo_history))
        .route("/{id}/extracted", get(extracted::extracted_rows))
}
