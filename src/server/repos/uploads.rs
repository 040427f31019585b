use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};

use crate::auth::AuthUser;
use crate::server::AppState;
use crate::server::dto::{HistoryResponse, UploadResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::{ExtractionStatus, FileKind, UploadAction};

/// Accepts a multipart upload (`file` plus a `fileType` of `srs` or
/// `sourceCode`), persists it under the repository's upload directory,
/// records the history entry, and runs extraction before responding.
/// Member-only.
pub async fn upload_file(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let member = state
        .store
        .is_member(&repo.id, &auth.id)
        .api_err("Failed to check membership")?;
    if !member {
        return Err(ApiError::forbidden("Access denied"));
    }

    let (kind, filename, content) = read_upload(&mut multipart).await?;

    // Stored under a fixed per-kind name; only the client extension is kept
    let stored_name = match file_extension(&filename) {
        Some(ext) => format!("{}.{ext}", kind.file_stem()),
        None => kind.file_stem().to_string(),
    };
    let repo_dir = state.config.uploads_dir().join(&repo.name);
    let file_path = repo_dir.join(&stored_name);
    let recorded_path = format!("uploads/{}/{stored_name}", repo.name);

    tokio::fs::create_dir_all(&repo_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload directory: {e}")))?;
    tokio::fs::write(&file_path, &content)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to save file: {e}")))?;

    state
        .store
        .append_history(
            &repo.id,
            &auth.id,
            kind,
            &UploadAction::Uploaded.label(kind),
            &recorded_path,
        )
        .api_err("Failed to record upload")?;
    state
        .store
        .update_repo_file(&repo.id, kind, &recorded_path)
        .api_err("Failed to update repository")?;
    state
        .store
        .update_extraction_status(&repo.id, ExtractionStatus::Pending)
        .api_err("Failed to update extraction status")?;

    let output = state
        .config
        .extracted_dir()
        .join(&repo.name)
        .join("latest_extracted.csv");

    let status = state
        .extractor
        .run(&repo.id, &file_path, &output)
        .await
        .api_err("Failed to run extraction")?;

    state
        .store
        .update_extraction_status(&repo.id, status)
        .api_err("Failed to update extraction status")?;

    if status != ExtractionStatus::Completed {
        return Err(ApiError::internal("Extraction failed"));
    }

    let repo = state
        .store
        .get_repo(&repo.id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;
    let extracted_report = format!("/extracted/{}/latest_extracted.csv", repo.name);

    Ok::<_, ApiError>(Json(ApiResponse::success(UploadResponse {
        message: "File uploaded and processed successfully!".to_string(),
        repo,
        extracted_report,
    })))
}

pub async fn repo_history(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let repo = state
        .store
        .get_repo(&id)
        .api_err("Failed to get repository")?
        .or_not_found("Repository not found")?;

    let srs_history = state
        .store
        .list_history(&repo.id, FileKind::Srs)
        .api_err("Failed to list history")?;
    let source_history = state
        .store
        .list_history(&repo.id, FileKind::SourceCode)
        .api_err("Failed to list history")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(HistoryResponse {
        id: repo.id,
        name: repo.name,
        srs_history,
        source_history,
    })))
}

async fn read_upload(multipart: &mut Multipart) -> Result<(FileKind, String, Vec<u8>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut file_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                file = Some((filename, data.to_vec()));
            }
            Some("fileType") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read fileType: {e}")))?;
                file_type = Some(value);
            }
            _ => {}
        }
    }

    let (filename, content) = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let kind = file_type
        .as_deref()
        .and_then(FileKind::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid file type"))?;

    Ok((kind, filename, content))
}

/// Extension of the client-supplied name, kept only when it is plain
/// alphanumeric so the stored name stays a single path component.
fn file_extension(filename: &str) -> Option<&str> {
    let ext = std::path::Path::new(filename).extension()?.to_str()?;
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}
