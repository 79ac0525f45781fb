//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::auth::validate_password;
use crate::auth::validation::{validate_email, validate_username};
use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. Malformed JSON and failed validation are both
/// rejected with 400; the latter carries field-level details.
///
/// # Example
///
/// ```ignore
/// use scloud::web::dto::ValidatedJson;
///
/// async fn login(
///     ValidatedJson(payload): ValidatedJson<LoginRequest>,
/// ) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================
//
// Each wraps the account rule from `crate::auth::validation` so a field is
// checked by one rule set, reported per field.

fn field_error(code: &'static str, message: String) -> validator::ValidationError {
    validator::ValidationError::new(code).with_message(message.into())
}

/// Validate an account email.
pub fn account_email(value: &str) -> Result<(), validator::ValidationError> {
    validate_email(value).map_err(|e| field_error("email", e.to_string()))
}

/// Validate a display name.
pub fn account_username(value: &str) -> Result<(), validator::ValidationError> {
    validate_username(value).map_err(|e| field_error("username", e.to_string()))
}

/// Validate a password's length.
pub fn account_password(value: &str) -> Result<(), validator::ValidationError> {
    validate_password(value).map_err(|e| field_error("password", e.to_string()))
}
