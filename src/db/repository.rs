//! User repository for SCloud.
//!
//! This module provides CRUD operations for accounts in the database.

use sqlx::{QueryBuilder, SqlitePool};

use crate::auth::ProfileUpdate;
use crate::store::{NewUser, UserRecord};
use crate::{Result, ScloudError};

const USER_COLUMNS: &str =
    "email, username, password_hash, gender, date_of_birth, created_at, updated_at";

/// Repository for account CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account.
    ///
    /// The email primary key makes the existence check and the insert a
    /// single atomic statement; a duplicate yields `Conflict`.
    pub async fn create(&self, new_user: NewUser, now: String) -> Result<UserRecord> {
        let record = UserRecord::from_new(new_user, now);

        sqlx::query(
            "INSERT INTO users (email, username, password_hash, gender, date_of_birth, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.password_hash)
        .bind(&record.gender)
        .bind(&record.date_of_birth)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ScloudError::Conflict("user".to_string())
            }
            e => ScloudError::Database(e.to_string()),
        })?;

        Ok(record)
    }

    /// Get an account by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let result = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Apply a profile update and refresh `updated_at`.
    ///
    /// Returns the updated account, or None if not found.
    pub async fn update(
        &self,
        email: &str,
        update: &ProfileUpdate,
        now: String,
    ) -> Result<Option<UserRecord>> {
        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref username) = update.username {
            separated.push("username = ");
            separated.push_bind_unseparated(username.clone());
        }
        if let Some(ref gender) = update.gender {
            separated.push("gender = ");
            separated.push_bind_unseparated(gender.clone());
        }
        if let Some(ref date_of_birth) = update.date_of_birth {
            separated.push("date_of_birth = ");
            separated.push_bind_unseparated(date_of_birth.clone());
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(now);

        query.push(" WHERE email = ");
        query.push_bind(email);

        let result = query.build().execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_email(email).await
    }

    /// Delete an account by email.
    ///
    /// Returns true if an account was deleted, false if not found.
    pub async fn delete(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    const T0: &str = "2024-01-01T00:00:00.000Z";
    const T1: &str = "2024-01-02T00:00:00.000Z";

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(
                NewUser::new("alice@example.com", "alice", "hash").with_gender("female"),
                T0.to_string(),
            )
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.gender.as_deref(), Some("female"));
        assert_eq!(user.created_at, T0);
        assert_eq!(user.updated_at, T0);
        assert!(repo.get_by_email("alice@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create(NewUser::new("alice@example.com", "alice", "h1"), T0.to_string())
            .await
            .unwrap();
        let result = repo
            .create(NewUser::new("alice@example.com", "other", "h2"), T0.to_string())
            .await;

        assert!(matches!(result, Err(ScloudError::Conflict(_))));
        let stored = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(stored.username, "alice");
    }

    #[tokio::test]
    async fn test_get_by_email_not_found() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(NewUser::new("alice@example.com", "alice", "hash"), T0.to_string())
            .await
            .unwrap();

        let updated = repo
            .update(
                "alice@example.com",
                &ProfileUpdate::new().username("Alice").date_of_birth("1990-05-01"),
                T1.to_string(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.username, "Alice");
        assert_eq!(updated.date_of_birth.as_deref(), Some("1990-05-01"));
        assert_eq!(updated.gender, None);
        assert_eq!(updated.password_hash, "hash");
        assert_eq!(updated.created_at, T0);
        assert_eq!(updated.updated_at, T1);
    }

    #[tokio::test]
    async fn test_update_nonexistent_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let result = repo
            .update(
                "nobody@example.com",
                &ProfileUpdate::new().username("x"),
                T1.to_string(),
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(NewUser::new("alice@example.com", "alice", "hash"), T0.to_string())
            .await
            .unwrap();

        assert!(repo.delete("alice@example.com").await.unwrap());
        assert!(!repo.delete("alice@example.com").await.unwrap());
        assert!(repo.get_by_email("alice@example.com").await.unwrap().is_none());
    }
}
