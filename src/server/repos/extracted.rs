use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::extract::read_report;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};

/// Returns the rows of the repository's latest extraction report, one JSON
/// object per CSV row. A repository that has never completed an extraction
/// yields an empty list rather than an error.
pub async fn extracted_rows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let report_path = state
        .config
        .extracted_dir()
        .join(&repo.name)
        .join("latest_extracted.csv");

    let rows = read_report(&report_path).api_err("Failed to read extraction report")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}
