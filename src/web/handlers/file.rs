//! File handlers for Web API.

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::file::UploadRequest;
use crate::web::dto::{
    AccessUrlResponse, ApiResponse, DeleteFileResponse, FileListResponse, FileResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

fn too_large(max_bytes: u64) -> ApiError {
    ApiError::bad_request(format!("File too large (max {}MB)", max_bytes / 1024 / 1024))
}

/// Read a multipart field, failing as soon as it passes `max_bytes`.
async fn read_limited(mut field: Field<'_>, max_bytes: u64) -> Result<Vec<u8>, ApiError> {
    let mut content = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return too_large(max_bytes);
        }
        tracing::warn!("Failed to read file content: {}", e);
        ApiError::bad_request("Failed to read file")
    })? {
        if (content.len() + chunk.len()) as u64 > max_bytes {
            return Err(too_large(max_bytes));
        }
        content.extend_from_slice(&chunk);
    }

    Ok(content)
}

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut upload: Option<UploadRequest> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return too_large(state.max_upload_size);
        }
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("No file provided"))?;
        let content_type = field.content_type().map(|s| s.to_string());
        let bytes = read_limited(field, state.max_upload_size).await?;

        let mut request = UploadRequest::new(file_name, bytes);
        if let Some(content_type) = content_type {
            request = request.with_content_type(content_type);
        }
        upload = Some(request);
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let record = state.files.upload(&principal.email, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(record.into())),
    ))
}

/// GET /api/files - List the caller's files, newest first.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<FileListResponse>>, ApiError> {
    let records = state.files.list(&principal.email).await?;
    Ok(Json(ApiResponse::new(records.into())))
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let record = state.files.get(&principal.email, &file_id).await?;
    Ok(Json(ApiResponse::new(record.into())))
}

/// GET /api/files/:id/download - Issue a short-lived download URL.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<AccessUrlResponse>>, ApiError> {
    let access = state.files.download_url(&principal.email, &file_id).await?;
    Ok(Json(ApiResponse::new(AccessUrlResponse::download(access))))
}

/// GET /api/files/:id/share - Issue a long-lived share URL.
pub async fn share_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<AccessUrlResponse>>, ApiError> {
    let access = state.files.share_url(&principal.email, &file_id).await?;
    Ok(Json(ApiResponse::new(AccessUrlResponse::share(access))))
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<DeleteFileResponse>>, ApiError> {
    state.files.delete(&principal.email, &file_id).await?;
    Ok(Json(ApiResponse::new(DeleteFileResponse {
        file_id,
        deleted: true,
    })))
}
