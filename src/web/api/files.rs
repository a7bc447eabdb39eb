//! File Admin API
//!
//! CRUD over the content sandbox. Every route sits behind `require_auth`,
//! and every successful mutation drops the parsed content cache.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::files::{DirectoryListing, FileContent};

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub source_path: String,
    pub destination_path: String,
}

/// Path affected by a mutation
#[derive(Debug, Serialize)]
pub struct PathResult {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub uploaded: Vec<String>,
}

/// `GET /list`, `GET /list/{*path}`
pub async fn list_root(State(state): State<AppState>) -> Result<Json<ApiResponse<DirectoryListing>>, ApiError> {
    Ok(ApiResponse::ok(state.files.list("").await?))
}

pub async fn list_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ApiResponse<DirectoryListing>>, ApiError> {
    Ok(ApiResponse::ok(state.files.list(&path).await?))
}

/// `GET /read/{*path}`
pub async fn read_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<ApiResponse<FileContent>>, ApiError> {
    Ok(ApiResponse::ok(state.files.read(&path).await?))
}

/// `POST /save/{*path}`
pub async fn save_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<ApiResponse<PathResult>>, ApiError> {
    let path = state.files.save(&path, &req.content).await?;
    state.content.invalidate();
    Ok(ApiResponse::ok_with_message(PathResult { path }, "File saved"))
}

/// `POST /delete`
pub async fn delete_path(
    State(state): State<AppState>,
    Json(req): Json<PathRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.files.delete(&req.path).await?;
    state.content.invalidate();
    Ok(ApiResponse::message("Deleted"))
}

/// `POST /rename`
pub async fn rename_path(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<PathResult>>, ApiError> {
    let path = state.files.rename(&req.old_path, &req.new_path).await?;
    state.content.invalidate();
    Ok(ApiResponse::ok_with_message(PathResult { path }, "Renamed"))
}

/// `POST /move`
pub async fn move_path(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<ApiResponse<PathResult>>, ApiError> {
    let path = state
        .files
        .move_into(&req.source_path, &req.destination_path)
        .await?;
    state.content.invalidate();
    Ok(ApiResponse::ok_with_message(PathResult { path }, "Moved"))
}

/// `POST /create-folder`
pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<PathRequest>,
) -> Result<Json<ApiResponse<PathResult>>, ApiError> {
    let path = state.files.create_folder(&req.path).await?;
    state.content.invalidate();
    Ok(ApiResponse::ok_with_message(PathResult { path }, "Folder created"))
}

/// `GET /download/{*path}`
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let download = state.files.download(&path).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.filename.replace(['"', '\\'], "_")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(download.bytes),
    )
        .into_response())
}

/// `POST /upload`
pub async fn upload_root(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResult>>, ApiError> {
    upload(state, None, multipart).await
}

/// `POST /upload/{*path}`
pub async fn upload_into(
    State(state): State<AppState>,
    Path(path): Path<String>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResult>>, ApiError> {
    upload(state, Some(path), multipart).await
}

async fn upload(
    state: AppState,
    folder: Option<String>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResult>>, ApiError> {
    let mut folder = folder;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let filename = field.file_name().map(str::to_string);
        match filename {
            Some(name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                files.push((name, bytes));
            }
            // The URL wins over a form field
            None if field.name() == Some("path") && folder.is_none() => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid path field: {}", e)))?;
                folder = Some(text);
            }
            None => {}
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    let folder = folder.unwrap_or_default();
    let stored = state.files.store_uploads(&folder, &files).await;
    // A write can fail after earlier files landed
    state.content.invalidate();
    let uploaded = stored?;

    info!(count = uploaded.len(), folder = %folder, "Files uploaded");
    let message = format!("Uploaded {} file(s)", uploaded.len());
    Ok(ApiResponse::ok_with_message(UploadResult { uploaded }, message))
}
