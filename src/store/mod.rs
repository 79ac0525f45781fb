//! Metadata and object storage for SCloud.
//!
//! Two traits describe the stores the file lifecycle runs against:
//!
//! - [`MetadataStore`]: accounts keyed by email and file records keyed by
//!   `(owner_id, file_id)`
//! - [`ObjectStore`]: opaque bytes keyed by object key, plus signed access URLs
//!
//! Each has an in-memory implementation and a persistent one. The backend is
//! chosen once from configuration when the application state is built, and
//! wrapped so that every call is bounded by the store timeout.

mod fs;
mod memory;
mod model;
pub mod presign;
#[cfg(feature = "sqlite")]
mod sqlite;
mod timeout;

pub use fs::FsObjectStore;
pub use memory::{MemoryMetadataStore, MemoryObjectStore};
pub use model::{
    now_rfc3339, AccessUrl, FileRecord, NewUser, PublicUser, StoredObject, UserRecord,
};
pub use presign::{SignatureError, UrlSigner};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMetadataStore;
pub use timeout::{bounded, TimedMetadataStore, TimedObjectStore, DEFAULT_STORE_TIMEOUT};

use async_trait::async_trait;

use crate::auth::ProfileUpdate;
use crate::Result;

/// Account and file metadata.
///
/// Every file operation takes the owner as its partition key. A record
/// belonging to another owner is reported as `NotFound`.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create an account. Fails with `Conflict` if the email exists.
    async fn create_user(&self, new_user: NewUser) -> Result<PublicUser>;

    /// Get an account's public projection.
    async fn get_user(&self, email: &str) -> Result<PublicUser>;

    /// Get an account including its password digest. Used by login only.
    async fn get_credentials(&self, email: &str) -> Result<UserRecord>;

    /// Apply a whitelisted profile update and refresh `updated_at`.
    async fn update_user(&self, email: &str, update: ProfileUpdate) -> Result<PublicUser>;

    /// Delete an account.
    async fn delete_user(&self, email: &str) -> Result<()>;

    /// Insert or replace a file record.
    async fn create_file(&self, record: FileRecord) -> Result<FileRecord>;

    /// List an owner's files, newest first.
    async fn list_files(&self, owner_id: &str) -> Result<Vec<FileRecord>>;

    /// Get one file of an owner.
    async fn get_file(&self, owner_id: &str, file_id: &str) -> Result<FileRecord>;

    /// Delete one file record of an owner.
    async fn delete_file(&self, owner_id: &str, file_id: &str) -> Result<()>;

    /// Release backend resources.
    async fn close(&self) {}
}

/// Opaque object bytes addressed by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes under `key`, replacing any previous object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    /// Load an object. Fails with `NotFound` if absent.
    async fn get(&self, key: &str) -> Result<StoredObject>;

    /// Remove an object. Fails with `NotFound` if absent.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Issue a URL granting read access to `key` for `ttl_secs`.
    async fn issue_access_url(&self, key: &str, ttl_secs: u64) -> Result<AccessUrl>;
}
