//! File management module for SCloud.
//!
//! This module provides the file lifecycle: upload, listing, access URLs
//! and deletion, keeping the object store and the metadata store in step.

mod service;

pub use service::{FileAccess, FileService, UploadRequest};

use uuid::Uuid;

/// Maximum length for a file name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum upload size (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Default lifetime of a download URL (1 hour).
pub const DOWNLOAD_URL_TTL_SECS: u64 = 3600;

/// Default lifetime of a share URL (24 hours).
pub const SHARE_URL_TTL_SECS: u64 = 86400;

/// Generate a new file id.
///
/// UUIDv7 strings sort lexicographically in creation order.
pub fn new_file_id() -> String {
    Uuid::now_v7().to_string()
}

/// Derive the object key for an owner's file.
///
/// # Examples
///
/// ```
/// use scloud::file::object_key;
///
/// assert_eq!(
///     object_key("alice@example.com", "0190", "report.pdf"),
///     "users/alice@example.com/0190-report.pdf"
/// );
/// ```
pub fn object_key(owner_id: &str, file_id: &str, file_name: &str) -> String {
    format!("users/{owner_id}/{file_id}-{file_name}")
}
