//! SQLite metadata store.

use async_trait::async_trait;

use super::model::{now_rfc3339, FileRecord, NewUser, PublicUser, UserRecord};
use super::MetadataStore;
use crate::auth::ProfileUpdate;
use crate::db::{Database, FileRepository, UserRepository};
use crate::{Result, ScloudError};

/// Metadata store persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    db: Database,
}

impl SqliteMetadataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open a migrated in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn files(&self) -> FileRepository<'_> {
        FileRepository::new(self.db.pool())
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn create_user(&self, new_user: NewUser) -> Result<PublicUser> {
        let record = self.users().create(new_user, now_rfc3339()).await?;
        Ok(record.into_public())
    }

    async fn get_user(&self, email: &str) -> Result<PublicUser> {
        Ok(self.get_credentials(email).await?.into_public())
    }

    async fn get_credentials(&self, email: &str) -> Result<UserRecord> {
        self.users()
            .get_by_email(email)
            .await?
            .ok_or_else(|| ScloudError::NotFound("user".to_string()))
    }

    async fn update_user(&self, email: &str, update: ProfileUpdate) -> Result<PublicUser> {
        self.users()
            .update(email, &update, now_rfc3339())
            .await?
            .map(UserRecord::into_public)
            .ok_or_else(|| ScloudError::NotFound("user".to_string()))
    }

    async fn delete_user(&self, email: &str) -> Result<()> {
        if self.users().delete(email).await? {
            Ok(())
        } else {
            Err(ScloudError::NotFound("user".to_string()))
        }
    }

    async fn create_file(&self, record: FileRecord) -> Result<FileRecord> {
        self.files().upsert(&record).await?;
        Ok(record)
    }

    async fn list_files(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        self.files().list_by_owner(owner_id).await
    }

    async fn get_file(&self, owner_id: &str, file_id: &str) -> Result<FileRecord> {
        self.files()
            .get(owner_id, file_id)
            .await?
            .ok_or_else(|| ScloudError::NotFound("file".to_string()))
    }

    async fn delete_file(&self, owner_id: &str, file_id: &str) -> Result<()> {
        if self.files().delete(owner_id, file_id).await? {
            Ok(())
        } else {
            Err(ScloudError::NotFound("file".to_string()))
        }
    }

    async fn close(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_user_lifecycle() {
        let store = SqliteMetadataStore::open_in_memory().await.unwrap();

        let user = store
            .create_user(NewUser::new("alice@example.com", "alice", "hash"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let creds = store.get_credentials("alice@example.com").await.unwrap();
        assert_eq!(creds.password_hash, "hash");

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = store
            .update_user("alice@example.com", ProfileUpdate::new().gender("female"))
            .await
            .unwrap();
        assert_eq!(updated.gender.as_deref(), Some("female"));
        assert_eq!(updated.username, "alice");
        assert!(updated.updated_at > user.updated_at);

        store.delete_user("alice@example.com").await.unwrap();
        assert!(matches!(
            store.get_user("alice@example.com").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_user("alice@example.com").await,
            Err(ScloudError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let store = SqliteMetadataStore::open_in_memory().await.unwrap();
        store
            .create_user(NewUser::new("alice@example.com", "alice", "hash"))
            .await
            .unwrap();
        let result = store
            .create_user(NewUser::new("alice@example.com", "alice2", "hash2"))
            .await;
        assert!(matches!(result, Err(ScloudError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_create_user_single_winner() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("race.db");
        let store = Arc::new(
            SqliteMetadataStore::open(path.to_str().unwrap())
                .await
                .unwrap(),
        );

        let handles: Vec<_> = (0..8)
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
        store.close().await;
    }

    #[tokio::test]
    async fn test_file_not_found_for_other_owner() {
        let store = SqliteMetadataStore::open_in_memory().await.unwrap();
        let record = FileRecord {
            owner_id: "alice@example.com".to_string(),
            file_id: "0001".to_string(),
            file_name: "a.txt".to_string(),
            file_size: 5,
            content_type: "text/plain".to_string(),
            object_key: "users/alice@example.com/0001-a.txt".to_string(),
            uploaded_at: now_rfc3339(),
        };
        store.create_file(record.clone()).await.unwrap();

        assert_eq!(
            store.get_file("alice@example.com", "0001").await.unwrap(),
            record
        );
        assert!(matches!(
            store.get_file("bob@example.com", "0001").await,
            Err(ScloudError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_file("bob@example.com", "0001").await,
            Err(ScloudError::NotFound(_))
        ));

        store.delete_file("alice@example.com", "0001").await.unwrap();
        assert!(store
            .list_files("alice@example.com")
            .await
            .unwrap()
            .is_empty());
    }
}
