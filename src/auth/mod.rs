//! Authentication module for SCloud.
//!
//! This module provides password hashing, identity tokens, account
//! registration, login and profile management.

mod password;
mod profile;
mod registration;
mod session;
pub mod token;
pub mod validation;

pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use profile::{delete_account, get_profile, update_profile, ProfileUpdate};
pub use registration::{register, RegistrationRequest};
pub use session::{login, verify_session, AuthSession};
pub use token::{AuthError, IdentityClaims, TokenService, DEFAULT_TOKEN_EXPIRY_SECS};
pub use validation::ValidationError;
