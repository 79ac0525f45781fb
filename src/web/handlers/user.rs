//! Profile handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth;
use crate::web::dto::{
    ApiResponse, DeleteAccountResponse, UpdateProfileRequest, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// GET /api/users/profile - Get the caller's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = auth::get_profile(state.metadata.as_ref(), &principal.email).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// PUT /api/users/profile - Update username, gender or date of birth.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user =
        auth::update_profile(state.metadata.as_ref(), &principal.email, req.into()).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// DELETE /api/users/profile - Delete the caller's account and files.
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApiResponse<DeleteAccountResponse>>, ApiError> {
    let deleted_files =
        auth::delete_account(state.metadata.as_ref(), &state.files, &principal.email).await?;
    Ok(Json(ApiResponse::new(DeleteAccountResponse {
        deleted_files,
    })))
}
