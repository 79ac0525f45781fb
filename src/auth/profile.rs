//! Profile management for SCloud accounts.

use tracing::info;

use super::validation::{validate_date_of_birth, validate_gender, validate_username};
use crate::file::FileService;
use crate::store::{MetadataStore, PublicUser};
use crate::{Result, ScloudError};

/// Whitelisted profile update.
///
/// Only these fields can change after registration. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub username: Option<String>,
    /// New gender.
    pub gender: Option<String>,
    /// New date of birth (YYYY-MM-DD).
    pub date_of_birth: Option<String>,
}

impl ProfileUpdate {
    /// Create a new empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new display name.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set new gender.
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Set new date of birth.
    pub fn date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }

    /// Check if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.gender.is_none() && self.date_of_birth.is_none()
    }

    /// Reject an update with no fields.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ScloudError::NoOp);
        }
        Ok(())
    }

    /// Validate every field that is set.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref username) = self.username {
            validate_username(username).map_err(|e| ScloudError::Validation(e.to_string()))?;
        }
        if let Some(ref gender) = self.gender {
            validate_gender(gender).map_err(|e| ScloudError::Validation(e.to_string()))?;
        }
        if let Some(ref date_of_birth) = self.date_of_birth {
            validate_date_of_birth(date_of_birth)
                .map_err(|e| ScloudError::Validation(e.to_string()))?;
        }
        Ok(())
    }
}

/// Get an account's public profile.
pub async fn get_profile(store: &dyn MetadataStore, email: &str) -> Result<PublicUser> {
    store.get_user(email).await
}

/// Apply a profile update.
///
/// An empty update fails with [`ScloudError::NoOp`] before the store is
/// touched.
pub async fn update_profile(
    store: &dyn MetadataStore,
    email: &str,
    update: ProfileUpdate,
) -> Result<PublicUser> {
    update.ensure_not_empty()?;
    update.validate()?;

    let updated = store.update_user(email, update).await?;

    info!(email = %updated.email, username = %updated.username, "Profile updated");

    Ok(updated)
}

/// Delete an account and every file it owns.
///
/// Files go first; the account record is removed only once all of them
/// are gone. Returns the number of files deleted.
pub async fn delete_account(
    store: &dyn MetadataStore,
    files: &FileService,
    email: &str,
) -> Result<usize> {
    // Fail fast on an unknown account
    store.get_user(email).await?;

    let deleted_files = files.purge_owner(email).await?;
    store.delete_user(email).await?;

    info!(email = %email, deleted_files, "Account deleted");

    Ok(deleted_files)
}
