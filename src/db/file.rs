//! File metadata repository for SCloud.

use sqlx::SqlitePool;

use crate::store::FileRecord;
use crate::Result;

const FILE_COLUMNS: &str =
    "owner_id, file_id, file_name, file_size, content_type, object_key, uploaded_at";

/// Repository for file metadata, always addressed by owner.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace a record keyed by `(owner_id, file_id)`.
    pub async fn upsert(&self, record: &FileRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO files (owner_id, file_id, file_name, file_size, content_type, object_key, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (owner_id, file_id) DO UPDATE SET
                file_name = excluded.file_name,
                file_size = excluded.file_size,
                content_type = excluded.content_type,
                object_key = excluded.object_key,
                uploaded_at = excluded.uploaded_at",
        )
        .bind(&record.owner_id)
        .bind(&record.file_id)
        .bind(&record.file_name)
        .bind(record.file_size)
        .bind(&record.content_type)
        .bind(&record.object_key)
        .bind(&record.uploaded_at)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// List an owner's files, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let files = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = ? ORDER BY file_id DESC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;
        Ok(files)
    }

    /// Get one file of an owner.
    pub async fn get(&self, owner_id: &str, file_id: &str) -> Result<Option<FileRecord>> {
        let file = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = ? AND file_id = ?"
        ))
        .bind(owner_id)
        .bind(file_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(file)
    }

    /// Delete one file of an owner.
    ///
    /// Returns true if a record was deleted, false if not found.
    pub async fn delete(&self, owner_id: &str, file_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE owner_id = ? AND file_id = ?")
            .bind(owner_id)
            .bind(file_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
