//! Error types for SCloud.

use thiserror::Error;

use crate::auth::AuthError;

/// Common error type for SCloud.
#[derive(Error, Debug)]
pub enum ScloudError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Object or metadata store failure (including timeouts).
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Token authentication error.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Token signing failed.
    #[error("token signing error: {0}")]
    Token(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique key already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Resource not found (or owned by another principal).
    #[error("{0} not found")]
    NotFound(String),

    /// An update request carried no fields.
    #[error("no fields to update")]
    NoOp,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ScloudError {
    fn from(e: sqlx::Error) -> Self {
        ScloudError::Database(e.to_string())
    }
}

/// Result type alias for SCloud operations.
pub type Result<T> = std::result::Result<T, ScloudError>;
