//! In-process store backends.
//!
//! Contents live in `RwLock`-guarded maps and are lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::{
    now_rfc3339, AccessUrl, FileRecord, NewUser, PublicUser, StoredObject, UserRecord,
};
use super::presign::UrlSigner;
use super::{MetadataStore, ObjectStore};
use crate::auth::ProfileUpdate;
use crate::{Result, ScloudError};

/// Metadata store backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    users: RwLock<HashMap<String, UserRecord>>,
    // owner -> file_id -> record; BTreeMap keeps file ids ordered
    files: RwLock<HashMap<String, BTreeMap<String, FileRecord>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create_user(&self, new_user: NewUser) -> Result<PublicUser> {
        // Existence check and insert under one write lock
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(ScloudError::Conflict("user".to_string()));
        }
        let record = UserRecord::from_new(new_user, now_rfc3339());
        users.insert(record.email.clone(), record.clone());
        Ok(record.into_public())
    }

    async fn get_user(&self, email: &str) -> Result<PublicUser> {
        Ok(self.get_credentials(email).await?.into_public())
    }

    async fn get_credentials(&self, email: &str) -> Result<UserRecord> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| ScloudError::NotFound("user".to_string()))
    }

    async fn update_user(&self, email: &str, update: ProfileUpdate) -> Result<PublicUser> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(email)
            .ok_or_else(|| ScloudError::NotFound("user".to_string()))?;

        if let Some(username) = update.username {
            record.username = username;
        }
        if let Some(gender) = update.gender {
            record.gender = Some(gender);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            record.date_of_birth = Some(date_of_birth);
        }
        record.updated_at = now_rfc3339();

        Ok(record.clone().into_public())
    }

    async fn delete_user(&self, email: &str) -> Result<()> {
        self.users
            .write()
            .await
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| ScloudError::NotFound("user".to_string()))
    }

    async fn create_file(&self, record: FileRecord) -> Result<FileRecord> {
        self.files
            .write()
            .await
            .entry(record.owner_id.clone())
            .or_default()
            .insert(record.file_id.clone(), record.clone());
        Ok(record)
    }

    async fn list_files(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        Ok(self
            .files
            .read()
            .await
            .get(owner_id)
            .map(|files| files.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_file(&self, owner_id: &str, file_id: &str) -> Result<FileRecord> {
        self.files
            .read()
            .await
            .get(owner_id)
            .and_then(|files| files.get(file_id))
            .cloned()
            .ok_or_else(|| ScloudError::NotFound("file".to_string()))
    }

    async fn delete_file(&self, owner_id: &str, file_id: &str) -> Result<()> {
        let mut files = self.files.write().await;
        let owner_files = files
            .get_mut(owner_id)
            .ok_or_else(|| ScloudError::NotFound("file".to_string()))?;
        owner_files
            .remove(file_id)
            .ok_or_else(|| ScloudError::NotFound("file".to_string()))?;
        if owner_files.is_empty() {
            files.remove(owner_id);
        }
        Ok(())
    }
}

/// Object store backed by an in-process map.
#[derive(Debug)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    signer: Arc<UrlSigner>,
}

impl MemoryObjectStore {
    pub fn new(signer: Arc<UrlSigner>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer,
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<StoredObject> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ScloudError::NotFound("object".to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ScloudError::NotFound("object".to_string()))
    }

    async fn issue_access_url(&self, key: &str, ttl_secs: u64) -> Result<AccessUrl> {
        Ok(self.signer.issue(key, ttl_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(owner: &str, file_id: &str) -> FileRecord {
        FileRecord {
            owner_id: owner.to_string(),
            file_id: file_id.to_string(),
            file_name: "a.txt".to_string(),
            file_size: 1,
            content_type: "text/plain".to_string(),
            object_key: format!("users/{owner}/{file_id}-a.txt"),
            uploaded_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let store = MemoryMetadataStore::new();
        store
            .create_user(NewUser::new("alice@example.com", "alice", "h1"))
            .await
            .unwrap();

        let result = store
            .create_user(NewUser::new("alice@example.com", "other", "h2"))
            .await;
        assert!(matches!(result, Err(ScloudError::Conflict(_))));

        let record = store.get_credentials("alice@example.com").await.unwrap();
        assert_eq!(record.password_hash, "h1");
    }

    #[tokio::test]
    async fn test_concurrent_create_user_single_winner() {
        let store = Arc::new(MemoryMetadataStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create_user(NewUser::new("race@example.com", format!("u{i}"), "h"))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(ScloudError::Conflict(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn test_user_not_found() {
        let store = MemoryMetadataStore::new();
        assert!(matches!(
            store.get_user("x@example.com").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_user("x@example.com").await,
            Err(ScloudError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_files_are_owner_scoped_and_ordered() {
        let store = MemoryMetadataStore::new();
        store.create_file(file("alice", "0001")).await.unwrap();
        store.create_file(file("alice", "0003")).await.unwrap();
        store.create_file(file("alice", "0002")).await.unwrap();
        store.create_file(file("bob", "0009")).await.unwrap();

        let ids: Vec<_> = store
            .list_files("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.file_id)
            .collect();
        assert_eq!(ids, vec!["0003", "0002", "0001"]);

        assert!(matches!(
            store.get_file("bob", "0001").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_file("bob", "0001").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(store.list_files("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_file() {
        let store = MemoryMetadataStore::new();
        store.create_file(file("alice", "0001")).await.unwrap();

        store.delete_file("alice", "0001").await.unwrap();
        assert!(store.get_file("alice", "0001").await.is_err());
        assert!(store.list_files("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_object_put_get_delete() {
        let store = MemoryObjectStore::new(Arc::new(UrlSigner::new("s", "http://localhost")));

        store.put("k", b"hello".to_vec(), "text/plain").await.unwrap();
        let obj = store.get("k").await.unwrap();
        assert_eq!(obj.bytes, b"hello");
        assert_eq!(obj.content_type, "text/plain");

        // Overwrite
        store.put("k", b"bye".to_vec(), "text/plain").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().bytes, b"bye");
        assert_eq!(store.len().await, 1);

        store.delete("k").await.unwrap();
        assert!(matches!(store.get("k").await, Err(ScloudError::NotFound(_))));
        assert!(matches!(
            store.delete("k").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_issue_access_url() {
        let signer = Arc::new(UrlSigner::new("s", "http://localhost"));
        let store = MemoryObjectStore::new(Arc::clone(&signer));

        let url = store.issue_access_url("users/a/b", 60).await.unwrap();
        assert!(url.url.starts_with("http://localhost/objects/users/a/b?expires="));
        assert_eq!(url.expires_in, 60);
        let sig = signer.sign("users/a/b", url.expires_at);
        assert!(url.url.ends_with(&sig));
    }
}
