//! Store decorators that put an upper bound on every call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::error;

use super::{
    AccessUrl, FileRecord, MetadataStore, NewUser, ObjectStore, PublicUser, StoredObject,
    UserRecord,
};
use crate::auth::ProfileUpdate;
use crate::{Result, ScloudError};

/// Default upper bound for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a store call under `timeout`.
///
/// An elapsed call fails with [`ScloudError::Store`].
pub async fn bounded<T>(
    timeout: Duration,
    op: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => {
            error!(op = %op, timeout = ?timeout, "Store call timed out");
            Err(ScloudError::Store(format!("{op} timed out")))
        }
    }
}

/// A [`MetadataStore`] whose calls fail once `timeout` elapses.
pub struct TimedMetadataStore {
    inner: Arc<dyn MetadataStore>,
    timeout: Duration,
}

impl TimedMetadataStore {
    pub fn new(inner: Arc<dyn MetadataStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl MetadataStore for TimedMetadataStore {
    async fn create_user(&self, new_user: NewUser) -> Result<PublicUser> {
        bounded(self.timeout, "create_user", self.inner.create_user(new_user)).await
    }

    async fn get_user(&self, email: &str) -> Result<PublicUser> {
        bounded(self.timeout, "get_user", self.inner.get_user(email)).await
    }

    async fn get_credentials(&self, email: &str) -> Result<UserRecord> {
        bounded(
            self.timeout,
            "get_credentials",
            self.inner.get_credentials(email),
        )
        .await
    }

    async fn update_user(&self, email: &str, update: ProfileUpdate) -> Result<PublicUser> {
        bounded(
            self.timeout,
            "update_user",
            self.inner.update_user(email, update),
        )
        .await
    }

    async fn delete_user(&self, email: &str) -> Result<()> {
        bounded(self.timeout, "delete_user", self.inner.delete_user(email)).await
    }

    async fn create_file(&self, record: FileRecord) -> Result<FileRecord> {
        bounded(self.timeout, "create_file", self.inner.create_file(record)).await
    }

    async fn list_files(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        bounded(self.timeout, "list_files", self.inner.list_files(owner_id)).await
    }

    async fn get_file(&self, owner_id: &str, file_id: &str) -> Result<FileRecord> {
        bounded(
            self.timeout,
            "get_file",
            self.inner.get_file(owner_id, file_id),
        )
        .await
    }

    async fn delete_file(&self, owner_id: &str, file_id: &str) -> Result<()> {
        bounded(
            self.timeout,
            "delete_file",
            self.inner.delete_file(owner_id, file_id),
        )
        .await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// An [`ObjectStore`] whose calls fail once `timeout` elapses.
pub struct TimedObjectStore {
    inner: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl TimedObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl ObjectStore for TimedObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        bounded(
            self.timeout,
            "object put",
            self.inner.put(key, bytes, content_type),
        )
        .await
    }

    async fn get(&self, key: &str) -> Result<StoredObject> {
        bounded(self.timeout, "object get", self.inner.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        bounded(self.timeout, "object delete", self.inner.delete(key)).await
    }

    async fn issue_access_url(&self, key: &str, ttl_secs: u64) -> Result<AccessUrl> {
        bounded(
            self.timeout,
            "issue_access_url",
            self.inner.issue_access_url(key, ttl_secs),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryMetadataStore, MemoryObjectStore, UrlSigner};

    /// Object store that never answers.
    struct HangingObjectStore;

    #[async_trait]
    impl ObjectStore for HangingObjectStore {
        async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<()> {
            std::future::pending().await
        }
        async fn get(&self, _key: &str) -> Result<StoredObject> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            std::future::pending().await
        }
        async fn issue_access_url(&self, _key: &str, _ttl_secs: u64) -> Result<AccessUrl> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let ok = bounded(Duration::from_secs(1), "op", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<()> = bounded(Duration::from_secs(1), "op", async {
            Err(ScloudError::NotFound("User".to_string()))
        })
        .await;
        assert!(matches!(err, Err(ScloudError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_hanging_object_store_times_out() {
        let store = TimedObjectStore::new(Arc::new(HangingObjectStore), Duration::from_millis(20));

        match store.get("users/a/b").await {
            Err(ScloudError::Store(msg)) => assert_eq!(msg, "object get timed out"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timed_stores_forward_calls() {
        let metadata =
            TimedMetadataStore::new(Arc::new(MemoryMetadataStore::new()), DEFAULT_STORE_TIMEOUT);
        metadata
            .create_user(NewUser::new("alice@example.com", "alice", "hash"))
            .await
            .unwrap();
        assert_eq!(
            metadata.get_user("alice@example.com").await.unwrap().username,
            "alice"
        );

        let signer = Arc::new(UrlSigner::new("s", "http://localhost"));
        let objects = TimedObjectStore::new(
            Arc::new(MemoryObjectStore::new(signer)),
            DEFAULT_STORE_TIMEOUT,
        );
        objects.put("k", b"hi".to_vec(), "text/plain").await.unwrap();
        assert_eq!(objects.get("k").await.unwrap().bytes, b"hi");
    }
}
