//! Signed, time-limited access URLs.
//!
//! A URL carries the object key, a unix expiry and a hex HMAC-SHA256 over
//! `"{key}\n{expires}"`:
//!
//! ```text
//! {public_base_url}/objects/{key}?expires={unix}&signature={hex}
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use super::model::AccessUrl;

type HmacSha256 = Hmac<Sha256>;

/// Reasons an access URL is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The expiry has passed.
    #[error("access URL expired")]
    Expired,

    /// The signature does not match the key and expiry.
    #[error("access URL signature mismatch")]
    Mismatch,
}

/// Issues and checks access URLs with a shared secret.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl UrlSigner {
    /// Create a signer for URLs rooted at `public_base_url`.
    pub fn new(secret: &str, public_base_url: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Hex signature for a key and expiry.
    pub fn sign(&self, key: &str, expires: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can accept any key length");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Issue a URL for `key` valid for `ttl_secs` from now.
    pub fn issue(&self, key: &str, ttl_secs: u64) -> AccessUrl {
        self.issue_at(key, ttl_secs, chrono::Utc::now().timestamp())
    }

    fn issue_at(&self, key: &str, ttl_secs: u64, now: i64) -> AccessUrl {
        let expires = now.saturating_add(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
        let signature = self.sign(key, expires);
        AccessUrl {
            url: format!(
                "{}/objects/{}?expires={}&signature={}",
                self.base_url,
                encode_key(key),
                expires,
                signature
            ),
            expires_at: expires,
            expires_in: ttl_secs,
        }
    }

    /// Check a presented key, expiry and signature.
    pub fn verify(&self, key: &str, expires: i64, signature: &str) -> Result<(), SignatureError> {
        self.verify_at(key, expires, signature, chrono::Utc::now().timestamp())
    }

    fn verify_at(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let expected = self.sign(key, expires);
        let matches: bool = expected
            .as_bytes()
            .ct_eq(signature.to_ascii_lowercase().as_bytes())
            .into();
        if !matches {
            debug!(key = %key, "Access URL signature mismatch");
            return Err(SignatureError::Mismatch);
        }
        if now > expires {
            debug!(key = %key, expires, "Access URL expired");
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Percent-encode each path segment of an object key, keeping the slashes.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
