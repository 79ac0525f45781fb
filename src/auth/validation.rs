//! Input validation for SCloud accounts.
//!
//! This module provides validation functions for email addresses,
//! passwords, usernames and the optional profile fields.

use chrono::NaiveDate;
use thiserror::Error;

use super::password::{validate_password, PasswordError};

/// Maximum username (display name) length.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum gender field length.
pub const MAX_GENDER_LENGTH: usize = 32;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Email is empty.
    #[error("email is required")]
    EmailRequired,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format")]
    EmailInvalidFormat,

    /// Password does not meet the length rule.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Username is empty.
    #[error("username is required")]
    UsernameRequired,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains control characters.
    #[error("username contains invalid characters")]
    UsernameInvalidChars,

    /// Gender is too long or contains control characters.
    #[error("gender must be at most {MAX_GENDER_LENGTH} printable characters")]
    GenderInvalid,

    /// Date of birth is not a YYYY-MM-DD date.
    #[error("date of birth must be a YYYY-MM-DD date")]
    DateOfBirthInvalid,
}

/// Validate an email address.
///
/// This is the only email rule; request DTOs call it too. Accepts `local@domain.tld`: one `@`, no whitespace, and at least one dot
/// in the domain with text on both sides of it.
///
/// # Examples
///
/// ```
/// use scloud::auth::validation::validate_email;
///
/// assert!(validate_email("alice@example.com").is_ok());
/// assert!(validate_email("alice").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or(ValidationError::EmailInvalidFormat)?;
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    // Some dot must have a non-empty label on each side
    let has_dotted_domain = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_dotted_domain {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a username (display name).
///
/// Requirements:
/// - Not empty after trimming
/// - At most 50 characters
/// - No control characters
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if username.chars().any(char::is_control) {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}

/// Validate the free-form gender field.
pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if gender.chars().count() > MAX_GENDER_LENGTH || gender.chars().any(char::is_control) {
        return Err(ValidationError::GenderInvalid);
    }
    Ok(())
}

/// Validate a date of birth. Empty clears the field and is accepted.
pub fn validate_date_of_birth(date: &str) -> Result<(), ValidationError> {
    if date.is_empty() {
        return Ok(());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::DateOfBirthInvalid)
}

/// Validate all registration fields at once.
///
/// Returns the first validation error encountered.
pub fn validate_registration(
    email: &str,
    username: &str,
    password: &str,
) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_username(username)?;
    validate_password(password)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("user.name@example.co.jp").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
        assert!(validate_email("a@b.c").is_ok());
    }

    #[test]
    fn test_validate_email_invalid_format() {
        for email in [
            "invalid",
            "@example.com",
            "user@",
            "user@example",
            "user@@example.com",
            "user @example.com",
            "user@.com",
            "user@example.",
            "a@b@c.d",
        ] {
            assert_eq!(
                validate_email(email),
                Err(ValidationError::EmailInvalidFormat),
                "{email}"
            );
        }
    }

    #[test]
    fn test_validate_email_required() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
    }

    #[test]
    fn test_validate_email_too_long() {
        let long_email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            validate_email(&long_email),
            Err(ValidationError::EmailTooLong)
        );
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("Alice Liddell").is_ok());
        assert!(validate_username("アリス").is_ok());
        assert_eq!(validate_username(""), Err(ValidationError::UsernameRequired));
        assert_eq!(
            validate_username("   "),
            Err(ValidationError::UsernameRequired)
        );
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::UsernameTooLong)
        );
        assert_eq!(
            validate_username("al\nice"),
            Err(ValidationError::UsernameInvalidChars)
        );
    }

    #[test]
    fn test_validate_gender() {
        assert!(validate_gender("").is_ok());
        assert!(validate_gender("female").is_ok());
        assert_eq!(
            validate_gender(&"x".repeat(33)),
            Err(ValidationError::GenderInvalid)
        );
    }

    #[test]
    fn test_validate_date_of_birth() {
        assert!(validate_date_of_birth("").is_ok());
        assert!(validate_date_of_birth("1990-02-28").is_ok());
        assert_eq!(
            validate_date_of_birth("1990-02-30"),
            Err(ValidationError::DateOfBirthInvalid)
        );
        assert_eq!(
            validate_date_of_birth("28/02/1990"),
            Err(ValidationError::DateOfBirthInvalid)
        );
    }

    #[test]
    fn test_validate_registration_fails_on_first_error() {
        assert!(validate_registration("alice@example.com", "alice", "secret1").is_ok());
        assert_eq!(
            validate_registration("bad", "", "x"),
            Err(ValidationError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_registration("alice@example.com", "alice", "x"),
            Err(ValidationError::Password(PasswordError::TooShort))
        );
    }
}
