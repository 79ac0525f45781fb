//! API handlers and shared application state.

pub mod auth;
pub mod file;
pub mod object;
pub mod user;

pub use auth::*;
pub use file::*;
pub use object::*;
pub use user::*;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenService;
use crate::config::{Config, MetadataBackend, ObjectBackend};
use crate::file::{FileService, DEFAULT_MAX_FILE_SIZE};
use crate::store::{
    FsObjectStore, MemoryMetadataStore, MemoryObjectStore, MetadataStore, ObjectStore,
    TimedMetadataStore, TimedObjectStore, UrlSigner, DEFAULT_STORE_TIMEOUT,
};
use crate::Result;

/// Application state shared across handlers.
///
/// Built once at startup; every handler sees the same stores. Both stores
/// are wrapped so each call fails after the store timeout.
#[derive(Clone)]
pub struct AppState {
    /// Account and file metadata, bounded by the store timeout.
    pub metadata: Arc<dyn MetadataStore>,
    /// Object bytes, bounded by the store timeout.
    pub objects: Arc<dyn ObjectStore>,
    /// Identity token issuer and verifier.
    pub tokens: Arc<TokenService>,
    /// Access URL signer.
    pub signer: Arc<UrlSigner>,
    /// File lifecycle coordinator.
    pub files: FileService,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state with the default store timeout.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        objects: Arc<dyn ObjectStore>,
        tokens: TokenService,
        signer: Arc<UrlSigner>,
    ) -> Self {
        Self::with_store_timeout(metadata, objects, tokens, signer, DEFAULT_STORE_TIMEOUT)
    }

    /// Create a new application state whose store calls fail after
    /// `store_timeout`.
    pub fn with_store_timeout(
        metadata: Arc<dyn MetadataStore>,
        objects: Arc<dyn ObjectStore>,
        tokens: TokenService,
        signer: Arc<UrlSigner>,
        store_timeout: Duration,
    ) -> Self {
        // The file service bounds its own calls
        let files = FileService::new(metadata.clone(), objects.clone())
            .with_store_timeout(store_timeout);
        Self {
            metadata: Arc::new(TimedMetadataStore::new(metadata, store_timeout)),
            objects: Arc::new(TimedObjectStore::new(objects, store_timeout)),
            tokens: Arc::new(tokens),
            signer,
            files,
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Replace the file service (timeouts, URL lifetimes).
    pub fn with_file_service(mut self, files: FileService) -> Self {
        self.files = files;
        self
    }

    /// Set the upload size ceiling.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// State backed entirely by memory, with URLs rooted at `http://localhost`.
    pub fn in_memory(jwt_secret: &str, url_signing_secret: &str) -> Self {
        let signer = Arc::new(UrlSigner::new(url_signing_secret, "http://localhost"));
        Self::new(
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryObjectStore::new(signer.clone())),
            TokenService::new(jwt_secret, crate::auth::DEFAULT_TOKEN_EXPIRY_SECS),
            signer,
        )
    }

    /// Build the state described by `config`.
    ///
    /// The metadata and object backends are chosen here and never change
    /// afterwards.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let signer = Arc::new(UrlSigner::new(
            &config.storage.url_signing_secret,
            &config.server.public_base_url,
        ));

        let metadata: Arc<dyn MetadataStore> = match config.storage.metadata_backend {
            MetadataBackend::Memory => Arc::new(MemoryMetadataStore::new()),
            MetadataBackend::Sqlite => open_sqlite(&config.storage.database_path).await?,
        };

        let objects: Arc<dyn ObjectStore> = match config.storage.object_backend {
            ObjectBackend::Memory => Arc::new(MemoryObjectStore::new(signer.clone())),
            ObjectBackend::Filesystem => Arc::new(FsObjectStore::new(
                &config.storage.object_path,
                signer.clone(),
            )?),
        };

        tracing::info!(
            metadata = ?config.storage.metadata_backend,
            objects = ?config.storage.object_backend,
            "Storage backends initialized"
        );

        let store_timeout = Duration::from_secs(config.storage.store_timeout_secs);
        let files = FileService::new(metadata.clone(), objects.clone())
            .with_store_timeout(store_timeout)
            .with_url_ttls(
                config.storage.download_url_ttl_secs,
                config.storage.share_url_ttl_secs,
            );

        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_expiry_secs);

        Ok(
            Self::with_store_timeout(metadata, objects, tokens, signer, store_timeout)
                .with_file_service(files)
                .with_max_upload_size(config.storage.max_upload_bytes()),
        )
    }
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(path: &str) -> Result<Arc<dyn MetadataStore>> {
    let store = crate::store::SqliteMetadataStore::open(path).await?;
    tracing::info!(path = %path, "SQLite metadata store opened");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_path: &str) -> Result<Arc<dyn MetadataStore>> {
    Err(crate::ScloudError::Config(
        "metadata_backend = \"sqlite\" requires the sqlite feature".to_string(),
    ))
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("files", &self.files)
            .field("max_upload_size", &self.max_upload_size)
            .finish_non_exhaustive()
    }
}
