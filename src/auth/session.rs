//! Login and token verification for SCloud.

use tracing::{debug, info};

use super::password::verify_password;
use super::token::{AuthError, IdentityClaims, TokenService};
use crate::store::{MetadataStore, PublicUser};
use crate::{Result, ScloudError};

/// An authenticated account with a freshly issued token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The account.
    pub user: PublicUser,
    /// Signed identity token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Check credentials and issue a token.
///
/// An unknown email and a wrong password fail identically with
/// [`AuthError::InvalidCredentials`].
pub async fn login(
    store: &dyn MetadataStore,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<AuthSession> {
    let record = match store.get_credentials(email).await {
        Ok(record) => record,
        Err(ScloudError::NotFound(_)) => {
            debug!(email = %email, "Login for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e),
    };

    if !verify_password(password, &record.password_hash) {
        debug!(email = %email, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = record.into_public();
    let token = tokens.issue(&IdentityClaims::new(&user.email, &user.username))?;

    info!(email = %user.email, "User logged in");

    Ok(AuthSession {
        user,
        token,
        expires_in: tokens.expiry_secs(),
    })
}

/// Verify a token and load the account it names.
///
/// Fails with `NotFound` if the account was deleted after issuance.
pub async fn verify_session(
    store: &dyn MetadataStore,
    tokens: &TokenService,
    token: &str,
) -> Result<PublicUser> {
    let identity = tokens.verify(token)?;
    store.get_user(&identity.email).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{register, RegistrationRequest};
    use crate::store::MemoryMetadataStore;

    async fn setup() -> (MemoryMetadataStore, TokenService) {
        let store = MemoryMetadataStore::new();
        let tokens = TokenService::new("test-secret", 3600);
        register(
            &store,
            &tokens,
            RegistrationRequest::new("alice@example.com", "alice", "secret1"),
        )
        .await
        .unwrap();
        (store, tokens)
    }

    #[tokio::test]
    async fn test_login_success() {
        let (store, tokens) = setup().await;

        let session = login(&store, &tokens, "alice@example.com", "secret1")
            .await
            .unwrap();

        assert_eq!(session.user.email, "alice@example.com");
        let identity = tokens.verify(&session.token).unwrap();
        assert_eq!(identity.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (store, tokens) = setup().await;

        let result = login(&store, &tokens, "alice@example.com", "wrong-password").await;
        assert!(matches!(
            result,
            Err(ScloudError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let (store, tokens) = setup().await;

        let result = login(&store, &tokens, "nobody@example.com", "secret1").await;
        assert!(matches!(
            result,
            Err(ScloudError::Auth(AuthError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_register_login_verify_identity() {
        let (store, tokens) = setup().await;

        let session = login(&store, &tokens, "alice@example.com", "secret1")
            .await
            .unwrap();
        let user = verify_session(&store, &tokens, &session.token)
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_verify_session_deleted_user() {
        let (store, tokens) = setup().await;
        let session = login(&store, &tokens, "alice@example.com", "secret1")
            .await
            .unwrap();

        store.delete_user("alice@example.com").await.unwrap();

        let result = verify_session(&store, &tokens, &session.token).await;
        assert!(matches!(result, Err(ScloudError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_session_invalid_token() {
        let (store, tokens) = setup().await;
        let result = verify_session(&store, &tokens, "garbage").await;
        assert!(matches!(
            result,
            Err(ScloudError::Auth(AuthError::InvalidSignature))
        ));
    }
}
