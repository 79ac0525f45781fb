//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth;
use crate::web::dto::{
    ApiResponse, AuthResponse, LoginRequest, RegisterRequest, ValidatedJson, VerifyRequest,
    VerifyResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// POST /api/auth/register - Create an account and sign in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let session = auth::register(state.metadata.as_ref(), &state.tokens, req.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(session.into())),
    ))
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let session = auth::login(
        state.metadata.as_ref(),
        &state.tokens,
        &req.email,
        &req.password,
    )
    .await?;

    Ok(Json(ApiResponse::new(session.into())))
}

/// POST /api/auth/verify - Check a token and return its account.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<VerifyRequest>,
) -> Result<Json<ApiResponse<VerifyResponse>>, ApiError> {
    let user = auth::verify_session(state.metadata.as_ref(), &state.tokens, &req.token).await?;

    Ok(Json(ApiResponse::new(VerifyResponse {
        valid: true,
        user: user.into(),
    })))
}
