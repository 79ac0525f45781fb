//! Account registration for SCloud.

use tracing::info;

use super::password::hash_password;
use super::session::AuthSession;
use super::token::{IdentityClaims, TokenService};
use super::validation::{validate_date_of_birth, validate_gender, validate_registration};
use crate::store::{MetadataStore, NewUser};
use crate::{Result, ScloudError};

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Account email (identity key).
    pub email: String,
    /// Display name.
    pub username: String,
    /// Plaintext password (6-128 characters).
    pub password: String,
    /// Optional gender.
    pub gender: Option<String>,
    /// Optional date of birth (YYYY-MM-DD).
    pub date_of_birth: Option<String>,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
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

    fn validate(&self) -> Result<()> {
        validate_registration(&self.email, &self.username, &self.password)
            .map_err(|e| ScloudError::Validation(e.to_string()))?;
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

/// Register a new account and issue its first token.
///
/// This function:
/// 1. Validates all input fields
/// 2. Hashes the password
/// 3. Creates the account (fails with `Conflict` if the email is taken)
/// 4. Issues an identity token
pub async fn register(
    store: &dyn MetadataStore,
    tokens: &TokenService,
    request: RegistrationRequest,
) -> Result<AuthSession> {
    request.validate()?;

    let password_hash =
        hash_password(&request.password).map_err(|e| ScloudError::Validation(e.to_string()))?;

    let mut new_user = NewUser::new(&request.email, &request.username, password_hash);
    if let Some(gender) = request.gender {
        new_user = new_user.with_gender(gender);
    }
    if let Some(date_of_birth) = request.date_of_birth {
        new_user = new_user.with_date_of_birth(date_of_birth);
    }

    let user = store.create_user(new_user).await?;

    let token = tokens.issue(&IdentityClaims::new(&user.email, &user.username))?;

    info!(email = %user.email, username = %user.username, "New user registered");

    Ok(AuthSession {
        user,
        token,
        expires_in: tokens.expiry_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMetadataStore;

    fn tokens() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[tokio::test]
    async fn test_register_success() {
        let store = MemoryMetadataStore::new();
        let tokens = tokens();

        let session = register(
            &store,
            &tokens,
            RegistrationRequest::new("alice@example.com", "alice", "secret1")
                .with_gender("female")
                .with_date_of_birth("1990-05-01"),
        )
        .await
        .unwrap();

        assert_eq!(session.user.email, "alice@example.com");
        assert_eq!(session.user.gender.as_deref(), Some("female"));
        assert_eq!(session.expires_in, 3600);

        let identity = tokens.verify(&session.token).unwrap();
        assert_eq!(identity.email, "alice@example.com");
        assert_eq!(identity.username, "alice");

        // Stored digest is a hash, not the plaintext
        let record = store.get_credentials("alice@example.com").await.unwrap();
        assert_ne!(record.password_hash, "secret1");
        assert!(record.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryMetadataStore::new();
        let tokens = tokens();

        register(
            &store,
            &tokens,
            RegistrationRequest::new("alice@example.com", "alice", "secret1"),
        )
        .await
        .unwrap();

        let result = register(
            &store,
            &tokens,
            RegistrationRequest::new("alice@example.com", "other", "secret2"),
        )
        .await;
        assert!(matches!(result, Err(ScloudError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let store = MemoryMetadataStore::new();
        let tokens = tokens();

        for request in [
            RegistrationRequest::new("not-an-email", "alice", "secret1"),
            RegistrationRequest::new("alice@example.com", "", "secret1"),
            RegistrationRequest::new("alice@example.com", "alice", "short"),
            RegistrationRequest::new("alice@example.com", "alice", "secret1")
                .with_date_of_birth("01/05/1990"),
        ] {
            let result = register(&store, &tokens, request).await;
            assert!(matches!(result, Err(ScloudError::Validation(_))));
        }

        assert!(store.get_user("alice@example.com").await.is_err());
    }
}
