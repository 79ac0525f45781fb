//! Identity token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the account email as `sub`.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Result, ScloudError};

/// Default token lifetime (7 days).
pub const DEFAULT_TOKEN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Authentication failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token was tampered with, signed with another key, or malformed.
    #[error("invalid token")]
    InvalidSignature,

    /// Login with an unknown email or a wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// The identity a token vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Account email (identity key and owner id).
    pub email: String,
    /// Display name at issuance time.
    pub username: String,
}

impl IdentityClaims {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
        }
    }
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (account email).
    pub sub: String,
    /// Username.
    pub username: String,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Signs and verifies identity tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry_secs: u64,
}

impl TokenService {
    /// Create a token service from a secret key and token lifetime.
    pub fn new(secret: &str, expiry_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn expiry_secs(&self) -> u64 {
        self.expiry_secs
    }

    /// Issue a signed token for the given identity.
    pub fn issue(&self, identity: &IdentityClaims) -> Result<String> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.issue_at(identity, now)
    }

    fn issue_at(&self, identity: &IdentityClaims, iat: u64) -> Result<String> {
        let claims = TokenClaims {
            sub: identity.email.clone(),
            username: identity.username.clone(),
            iat,
            exp: iat + self.expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ScloudError::Token(e.to_string()))
    }

    /// Verify a token and return the identity it carries.
    pub fn verify(&self, token: &str) -> std::result::Result<IdentityClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidSignature,
            },
        )?;

        Ok(IdentityClaims {
            email: data.claims.sub,
            username: data.claims.username,
        })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> IdentityClaims {
        IdentityClaims::new("alice@example.com", "alice")
    }

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new("test-secret", DEFAULT_TOKEN_EXPIRY_SECS);
        let token = service.issue(&alice()).unwrap();

        let identity = service.verify(&token).unwrap();
        assert_eq!(identity, alice());
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = TokenService::new("test-secret", 3600);
        let t1 = service.issue(&alice()).unwrap();
        let t2 = service.issue(&alice()).unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn test_claims_content() {
        let service = TokenService::new("test-secret", 3600);
        let token = service.issue(&alice()).unwrap();

        let mut validation = Validation::default();
        validation.validate_exp = false;
        let data = decode::<TokenClaims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims.sub, "alice@example.com");
        assert_eq!(data.claims.username, "alice");
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
        assert!(uuid::Uuid::parse_str(&data.claims.jti).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::new("test-secret", 3600);
        let two_hours_ago = (chrono::Utc::now().timestamp() - 7200) as u64;
        let token = service.issue_at(&alice(), two_hours_ago).unwrap();

        assert_eq!(service.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = TokenService::new("secret1", 3600);
        let verifier = TokenService::new("secret2", 3600);
        let token = issuer.issue(&alice()).unwrap();

        assert_eq!(verifier.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_tampered_token() {
        let service = TokenService::new("test-secret", 3600);
        let token = service.issue(&alice()).unwrap();

        // Swap the payload for one claiming a different subject
        let mut parts: Vec<&str> = token.split('.').collect();
        let other = service
            .issue(&IdentityClaims::new("mallory@example.com", "mallory"))
            .unwrap();
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let forged = parts.join(".");

        // Signature no longer matches the payload
        let signature_of_alice = token.split('.').nth(2).unwrap();
        assert!(forged.ends_with(signature_of_alice));
        assert_eq!(service.verify(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_token() {
        let service = TokenService::new("test-secret", 3600);
        assert_eq!(service.verify(""), Err(AuthError::InvalidSignature));
        assert_eq!(
            service.verify("not.a.token"),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_debug_hides_keys() {
        let service = TokenService::new("super-secret", 3600);
        let debug = format!("{service:?}");
        assert!(!debug.contains("super-secret"));
    }
}
