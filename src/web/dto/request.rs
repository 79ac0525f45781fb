//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{account_email, account_password, account_username};
use crate::auth::{ProfileUpdate, RegistrationRequest};

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email (identity key).
    #[serde(default)]
    #[validate(custom(function = "account_email"))]
    pub email: String,
    /// Display name.
    #[serde(default)]
    #[validate(custom(function = "account_username"))]
    pub username: String,
    /// Password.
    #[serde(default)]
    #[validate(custom(function = "account_password"))]
    pub password: String,
    /// Gender (optional).
    #[serde(default)]
    pub gender: Option<String>,
    /// Date of birth, YYYY-MM-DD (optional).
    #[serde(default, alias = "dateOfBirth")]
    pub date_of_birth: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        let mut request = RegistrationRequest::new(req.email, req.username, req.password);
        if let Some(gender) = req.gender {
            request = request.with_gender(gender);
        }
        if let Some(date_of_birth) = req.date_of_birth {
            request = request.with_date_of_birth(date_of_birth);
        }
        request
    }
}

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email.
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token verification request.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    /// Identity token to check.
    #[serde(default)]
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Profile update request.
///
/// Only these fields are accepted; anything else in the body is ignored.
/// `dateOfBirth` is accepted for `date_of_birth`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[serde(default)]
    pub username: Option<String>,
    /// New gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// New date of birth.
    #[serde(default, alias = "dateOfBirth")]
    pub date_of_birth: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            username: req.username,
            gender: req.gender,
            date_of_birth: req.date_of_birth,
        }
    }
}

/// Query parameters of a signed object URL.
#[derive(Debug, Deserialize)]
pub struct SignedObjectQuery {
    /// Unix expiry.
    pub expires: Option<i64>,
    /// Hex signature.
    pub signature: Option<String>,
}
