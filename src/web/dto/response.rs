//! Response DTOs for Web API.

use serde::Serialize;

use crate::auth::AuthSession;
use crate::file::FileAccess;
use crate::store::{FileRecord, PublicUser};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Public account profile.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub username: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PublicUser> for UserResponse {
    fn from(user: PublicUser) -> Self {
        Self {
            email: user.email,
            username: user.username,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Register and login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Account profile.
    pub user: UserResponse,
    /// Identity token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            token: session.token,
            expires_in: session.expires_in,
        }
    }
}

/// Token verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: UserResponse,
}

/// Account deletion response.
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    /// Number of files removed with the account.
    pub deleted_files: usize,
}

/// File metadata.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub file_id: String,
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_at: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            file_id: record.file_id,
            file_name: record.file_name,
            file_size: record.file_size,
            content_type: record.content_type,
            uploaded_at: record.uploaded_at,
        }
    }
}

/// File listing, newest first.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    pub count: usize,
}

impl From<Vec<FileRecord>> for FileListResponse {
    fn from(records: Vec<FileRecord>) -> Self {
        let files: Vec<FileResponse> = records.into_iter().map(FileResponse::from).collect();
        Self {
            count: files.len(),
            files,
        }
    }
}

/// Download or share URL.
///
/// The URL is also repeated under `downloadUrl` or `shareUrl`, the names the
/// web client reads.
#[derive(Debug, Serialize)]
pub struct AccessUrlResponse {
    /// Signed URL.
    pub url: String,
    pub file_name: String,
    /// Seconds the URL stays valid.
    pub expires_in: u64,
    /// Unix expiry.
    pub expires_at: i64,
    #[serde(rename = "downloadUrl", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(rename = "shareUrl", skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
}

impl AccessUrlResponse {
    fn from_access(access: FileAccess) -> Self {
        Self {
            url: access.url.url,
            file_name: access.record.file_name,
            expires_in: access.url.expires_in,
            expires_at: access.url.expires_at,
            download_url: None,
            share_url: None,
        }
    }

    /// Response for a download URL.
    pub fn download(access: FileAccess) -> Self {
        let mut response = Self::from_access(access);
        response.download_url = Some(response.url.clone());
        response
    }

    /// Response for a share URL.
    pub fn share(access: FileAccess) -> Self {
        let mut response = Self::from_access(access);
        response.share_url = Some(response.url.clone());
        response
    }
}

/// File deletion response.
#[derive(Debug, Serialize)]
pub struct DeleteFileResponse {
    pub file_id: String,
    pub deleted: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_id: &str) -> FileRecord {
        FileRecord {
            owner_id: "alice@example.com".to_string(),
            file_id: file_id.to_string(),
            file_name: "notes.txt".to_string(),
            file_size: 5,
            content_type: "text/plain".to_string(),
            object_key: format!("users/alice@example.com/{file_id}-notes.txt"),
            uploaded_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_file_response_hides_owner_and_key() {
        let json = serde_json::to_value(FileResponse::from(record("1"))).unwrap();
        assert_eq!(json["file_id"], "1");
        assert!(json.get("owner_id").is_none());
        assert!(json.get("object_key").is_none());
    }

    #[test]
    fn test_file_list_count() {
        let list = FileListResponse::from(vec![record("2"), record("1")]);
        assert_eq!(list.count, 2);
        assert_eq!(list.files[0].file_id, "2");
    }

    fn access(ttl: u64) -> FileAccess {
        FileAccess {
            record: record("1"),
            url: crate::store::AccessUrl {
                url: "http://localhost/objects/k?expires=1&signature=ab".to_string(),
                expires_in: ttl,
                expires_at: 1,
            },
        }
    }

    #[test]
    fn test_access_url_client_names() {
        let json = serde_json::to_value(AccessUrlResponse::download(access(3600))).unwrap();
        assert_eq!(json["downloadUrl"], json["url"]);
        assert!(json.get("shareUrl").is_none());

        let json = serde_json::to_value(AccessUrlResponse::share(access(86400))).unwrap();
        assert_eq!(json["shareUrl"], json["url"]);
        assert!(json.get("downloadUrl").is_none());
        assert_eq!(json["expires_in"], 86400);
    }

    #[test]
    fn test_api_response_envelope() {
        let json = serde_json::to_value(ApiResponse::new(DeleteAccountResponse {
            deleted_files: 3,
        }))
        .unwrap();
        assert_eq!(json["data"]["deleted_files"], 3);
    }
}
