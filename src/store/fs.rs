//! Filesystem object store.
//!
//! Objects are stored in a sharded directory structure named by the
//! SHA-256 of their key, with the content type in a sidecar file:
//!
//! ```text
//! {base_path}/
//! ├── 3f/
//! │   ├── 3fa2...e9
//! │   └── 3fa2...e9.type
//! └── ...
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::model::{AccessUrl, StoredObject};
use super::presign::UrlSigner;
use super::ObjectStore;
use crate::{Result, ScloudError};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    /// Base directory for object storage.
    base_path: PathBuf,
    signer: Arc<UrlSigner>,
}

impl FsObjectStore {
    /// Create a store rooted at `base_path`.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>, signer: Arc<UrlSigner>) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path, signer })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the full path of the object stored under `key`.
    ///
    /// The path is `{base_path}/{shard}/{sha256(key)}` where shard is the
    /// first 2 hex characters of the digest.
    pub fn object_path(&self, key: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(key.as_bytes()));
        self.base_path.join(&digest[..2]).join(digest)
    }

    fn type_path(object_path: &Path) -> PathBuf {
        object_path.with_extension("type")
    }

    fn not_found() -> ScloudError {
        ScloudError::NotFound("object".to_string())
    }
}

/// Replace `path` with `bytes` so readers see the old or the new file, never
/// a partial one.
///
/// The data goes to a uniquely named file in the same directory first and
/// is then renamed over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("object");
    let tmp_path = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    let result = async {
        fs::write(&tmp_path, bytes).await?;
        fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let path = self.object_path(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Sidecar first so a visible object always has a type
        write_atomic(&Self::type_path(&path), content_type.as_bytes()).await?;
        write_atomic(&path, &bytes).await?;

        debug!(key = %key, size = bytes.len(), "Stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject> {
        let path = self.object_path(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Self::not_found()),
            Err(e) => return Err(e.into()),
        };

        let content_type = match fs::read_to_string(Self::type_path(&path)).await {
            Ok(content_type) => content_type,
            Err(e) if e.kind() == io::ErrorKind::NotFound => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) => return Err(e.into()),
        };

        Ok(StoredObject {
            bytes,
            content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.object_path(key);

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Self::not_found()),
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(Self::type_path(&path)).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        debug!(key = %key, "Deleted object");
        Ok(())
    }

    async fn issue_access_url(&self, key: &str, ttl_secs: u64) -> Result<AccessUrl> {
        Ok(self.signer.issue(key, ttl_secs))
    }
}
