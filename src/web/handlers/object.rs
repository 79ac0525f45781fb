//! Signed object access.
//!
//! Serves the URLs issued by the download and share endpoints. No bearer
//! token is involved; the signature is the credential.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::Response,
};
use std::sync::Arc;

use crate::store::SignatureError;
use crate::web::dto::SignedObjectQuery;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Length of a hyphenated UUID string.
const FILE_ID_LEN: usize = 36;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Control characters are dropped, quotes and backslashes replaced, and
/// non-ASCII names get an RFC 5987 `filename*` parameter.
pub fn content_disposition_header(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Recover the client file name from `users/<owner>/<file_id>-<name>`.
fn download_name(key: &str) -> &str {
    let last = key.rsplit('/').next().unwrap_or(key);
    match last.as_bytes().get(FILE_ID_LEN) {
        Some(b'-') => last.get(FILE_ID_LEN + 1..).unwrap_or(last),
        _ => last,
    }
}

/// GET /objects/*key - Fetch object bytes through a signed URL.
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedObjectQuery>,
) -> Result<Response<Body>, ApiError> {
    let (Some(expires), Some(signature)) = (query.expires, query.signature) else {
        return Err(ApiError::forbidden("Missing signature"));
    };

    state
        .signer
        .verify(&key, expires, &signature)
        .map_err(|e| match e {
            SignatureError::Expired => ApiError::forbidden("Access URL expired"),
            SignatureError::Mismatch => ApiError::forbidden("Invalid signature"),
        })?;

    let object = state.objects.get(&key).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, object.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(download_name(&key)),
        )
        .header(header::CONTENT_LENGTH, object.bytes.len())
        .body(Body::from(object.bytes))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}
