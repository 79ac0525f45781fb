//! Records shared by the metadata and object stores.

/// A stored account, including the password digest.
///
/// Only [`MetadataStore::get_credentials`](super::MetadataStore::get_credentials)
/// returns this type. Everything else sees [`PublicUser`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    /// Account email (identity key).
    pub email: String,
    /// Display name.
    pub username: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub gender: Option<String>,
    /// YYYY-MM-DD.
    pub date_of_birth: Option<String>,
    /// RFC 3339 UTC.
    pub created_at: String,
    /// RFC 3339 UTC.
    pub updated_at: String,
}

impl UserRecord {
    /// Build a fresh record with both timestamps set to `now`.
    pub fn from_new(new_user: NewUser, now: String) -> Self {
        Self {
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            gender: new_user.gender,
            date_of_birth: new_user.date_of_birth,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Drop the password digest.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            email: self.email,
            username: self.username,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Outward-facing projection of an account. Has no password field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUser {
    pub email: String,
    pub username: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Account email.
    pub email: String,
    /// Display name.
    pub username: String,
    /// Password digest (hash before constructing).
    pub password_hash: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
}

impl NewUser {
    /// Create a new account with the required fields.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password_hash: password_hash.into(),
            gender: None,
            date_of_birth: None,
        }
    }

    /// Set the gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Set the date of birth.
    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }
}

/// Metadata for one uploaded object, keyed by `(owner_id, file_id)`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Owner email.
    pub owner_id: String,
    /// Time-ordered UUIDv7 string.
    pub file_id: String,
    /// Client-supplied name.
    pub file_name: String,
    /// Size in bytes.
    pub file_size: i64,
    pub content_type: String,
    /// `users/<owner_id>/<file_id>-<file_name>`.
    pub object_key: String,
    /// RFC 3339 UTC.
    pub uploaded_at: String,
}

/// Object bytes with their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// A signed, time-limited URL granting read access to one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessUrl {
    pub url: String,
    /// Unix timestamp after which the URL is rejected.
    pub expires_at: i64,
    /// Lifetime the URL was issued with, in seconds.
    pub expires_in: u64,
}

/// Current time as an RFC 3339 UTC string with millisecond precision.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
