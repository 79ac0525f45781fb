//! File service for SCloud.
//!
//! Coordinates the object store and the metadata store:
//! - Upload writes the object first, then its record
//! - Delete removes the object first, then its record
//! - Access URLs are issued only for records the caller owns
//!
//! There is no transaction spanning both stores. A failed record write
//! after an upload triggers a best-effort delete of the object; a failed
//! object delete leaves the record in place so it can be retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use super::{
    new_file_id, object_key, DOWNLOAD_URL_TTL_SECS, MAX_FILENAME_LENGTH, SHARE_URL_TTL_SECS,
};
use crate::store::{
    bounded, now_rfc3339, AccessUrl, FileRecord, MetadataStore, ObjectStore,
    DEFAULT_STORE_TIMEOUT,
};
use crate::{Result, ScloudError};

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared content type (guessed from the name when absent).
    pub content_type: Option<String>,
    /// File content.
    pub bytes: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    /// Set the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(ScloudError::Validation("file name is required".to_string()));
        }
        if self.file_name.chars().count() > MAX_FILENAME_LENGTH {
            return Err(ScloudError::Validation(format!(
                "file name must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }
        if self
            .file_name
            .chars()
            .any(|c| c.is_control() || c == '/' || c == '\\')
        {
            return Err(ScloudError::Validation(
                "file name contains invalid characters".to_string(),
            ));
        }
        Ok(())
    }

    fn resolved_content_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.trim().is_empty() => ct.to_string(),
            _ => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

/// A file record together with a signed URL for its object.
#[derive(Debug, Clone)]
pub struct FileAccess {
    pub record: FileRecord,
    pub url: AccessUrl,
}

/// File service coordinating the object and metadata stores.
#[derive(Clone)]
pub struct FileService {
    metadata: Arc<dyn MetadataStore>,
    objects: Arc<dyn ObjectStore>,
    store_timeout: Duration,
    download_ttl_secs: u64,
    share_ttl_secs: u64,
}

impl FileService {
    /// Create a new FileService with default timeout and URL lifetimes.
    pub fn new(metadata: Arc<dyn MetadataStore>, objects: Arc<dyn ObjectStore>) -> Self {
        Self {
            metadata,
            objects,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            download_ttl_secs: DOWNLOAD_URL_TTL_SECS,
            share_ttl_secs: SHARE_URL_TTL_SECS,
        }
    }

    /// Set the upper bound for each store call.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Set the download and share URL lifetimes.
    pub fn with_url_ttls(mut self, download_ttl_secs: u64, share_ttl_secs: u64) -> Self {
        self.download_ttl_secs = download_ttl_secs;
        self.share_ttl_secs = share_ttl_secs;
        self
    }

    pub fn download_ttl_secs(&self) -> u64 {
        self.download_ttl_secs
    }

    pub fn share_ttl_secs(&self) -> u64 {
        self.share_ttl_secs
    }

    /// Run a store call under the configured timeout.
    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        bounded(self.store_timeout, op, fut).await
    }

    /// Upload a file for `owner`.
    ///
    /// The object is written before its record. If the record write fails
    /// the object is deleted again; if that also fails the orphan is logged
    /// and left behind.
    pub async fn upload(&self, owner: &str, request: UploadRequest) -> Result<FileRecord> {
        request.validate()?;

        let file_id = new_file_id();
        let key = object_key(owner, &file_id, &request.file_name);
        let content_type = request.resolved_content_type();
        let file_size = request.bytes.len() as i64;

        self.bounded(
            "object put",
            self.objects.put(&key, request.bytes, &content_type),
        )
        .await?;

        let record = FileRecord {
            owner_id: owner.to_string(),
            file_id,
            file_name: request.file_name,
            file_size,
            content_type,
            object_key: key.clone(),
            uploaded_at: now_rfc3339(),
        };

        match self
            .bounded("create_file", self.metadata.create_file(record))
            .await
        {
            Ok(record) => {
                info!(
                    owner = %owner,
                    file_id = %record.file_id,
                    size = record.file_size,
                    "File uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(owner = %owner, key = %key, error = %e, "Metadata write failed after upload, removing object");
                self.compensate_upload(owner, &key).await;
                Err(e)
            }
        }
    }

    /// List an owner's files, newest first.
    pub async fn list(&self, owner: &str) -> Result<Vec<FileRecord>> {
        self.bounded("list_files", self.metadata.list_files(owner))
            .await
    }

    /// Get one of an owner's files.
    pub async fn get(&self, owner: &str, file_id: &str) -> Result<FileRecord> {
        self.bounded("get_file", self.metadata.get_file(owner, file_id))
            .await
    }

    /// Issue a download URL for one of an owner's files.
    pub async fn download_url(&self, owner: &str, file_id: &str) -> Result<FileAccess> {
        self.access_url(owner, file_id, self.download_ttl_secs).await
    }

    /// Issue a share URL for one of an owner's files.
    pub async fn share_url(&self, owner: &str, file_id: &str) -> Result<FileAccess> {
        self.access_url(owner, file_id, self.share_ttl_secs).await
    }

    async fn access_url(&self, owner: &str, file_id: &str, ttl_secs: u64) -> Result<FileAccess> {
        let record = self.get(owner, file_id).await?;
        let url = self
            .bounded(
                "issue_access_url",
                self.objects.issue_access_url(&record.object_key, ttl_secs),
            )
            .await?;
        Ok(FileAccess { record, url })
    }

    /// Delete one of an owner's files.
    ///
    /// The record is removed only after the object delete succeeds. An
    /// object that is already gone counts as deleted, so a record left
    /// dangling by an earlier failure can still be cleaned up.
    pub async fn delete(&self, owner: &str, file_id: &str) -> Result<()> {
        let record = self.get(owner, file_id).await?;

        match self
            .bounded("object delete", self.objects.delete(&record.object_key))
            .await
        {
            Ok(()) => {}
            Err(ScloudError::NotFound(_)) => {
                warn!(owner = %owner, file_id = %file_id, key = %record.object_key, "Object already missing, removing record");
            }
            Err(e) => return Err(e),
        }

        self.bounded("delete_file", self.metadata.delete_file(owner, file_id))
            .await?;

        info!(owner = %owner, file_id = %file_id, "File deleted");
        Ok(())
    }

    /// Delete every file of an owner.
    ///
    /// Returns the number of files deleted. Stops at the first failure.
    pub async fn purge_owner(&self, owner: &str) -> Result<usize> {
        let files = self.list(owner).await?;
        let mut deleted = 0;
        for file in &files {
            self.delete(owner, &file.file_id).await?;
            deleted += 1;
        }
        if deleted > 0 {
            info!(owner = %owner, count = deleted, "Purged owner files");
        }
        Ok(deleted)
    }
}

impl FileService {
    async fn compensate_upload(&self, owner: &str, key: &str) {
        if let Err(e) = self.bounded("object delete", self.objects.delete(key)).await {
            error!(owner = %owner, key = %key, error = %e, "Failed to remove orphaned object");
        }
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("store_timeout", &self.store_timeout)
            .field("download_ttl_secs", &self.download_ttl_secs)
            .field("share_ttl_secs", &self.share_ttl_secs)
            .finish()
    }
}
