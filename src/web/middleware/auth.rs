//! Bearer token authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::auth::IdentityClaims;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// The authenticated caller.
///
/// `email` is the owner id for every file operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account email.
    pub email: String,
    /// Display name at token issuance.
    pub username: String,
}

impl From<IdentityClaims> for Principal {
    fn from(claims: IdentityClaims) -> Self {
        Self {
            email: claims.email,
            username: claims.username,
        }
    }
}

/// Extractor for authenticated users.
///
/// Use this extractor to require authentication for a handler. Only the
/// `Authorization: Bearer <token>` header is accepted; a missing,
/// malformed, invalid or expired token is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims.into()))
    }
}

/// Extract the token from an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/files");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[tokio::test]
    async fn test_extractor() {
        let state = Arc::new(AppState::in_memory("jwt-secret", "url-secret"));
        let token = state
            .tokens
            .issue(&IdentityClaims::new("alice@example.com", "alice"))
            .unwrap();

        let mut parts = parts_with(Some(&format!("Bearer {token}")));
        let AuthUser(principal) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(principal.email, "alice@example.com");
        assert_eq!(principal.username, "alice");

        let mut parts = parts_with(Some("Bearer not-a-token"));
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());

        let mut parts = parts_with(None);
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }
}
