//! Configuration module for SCloud.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ScloudError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = any origin, no credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Externally visible base URL, used when building access URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_public_base_url() -> String {
    "http://localhost:3001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            public_base_url: default_public_base_url(),
        }
    }
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Identity token expiry in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
}

fn default_token_expiry() -> u64 {
    7 * 24 * 60 * 60 // 7 days
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
        }
    }
}

/// Metadata store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataBackend {
    /// In-process maps. Contents are lost on restart.
    Memory,
    /// SQLite database via sqlx.
    Sqlite,
}

/// Object store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectBackend {
    /// In-process map. Contents are lost on restart.
    Memory,
    /// Sharded directory tree on the local filesystem.
    Filesystem,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Metadata store backend.
    #[serde(default = "default_metadata_backend")]
    pub metadata_backend: MetadataBackend,
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Object store backend.
    #[serde(default = "default_object_backend")]
    pub object_backend: ObjectBackend,
    /// Base directory for the filesystem object store.
    #[serde(default = "default_object_path")]
    pub object_path: String,
    /// Secret used to sign access URLs (must be set).
    #[serde(default)]
    pub url_signing_secret: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Lifetime of download URLs in seconds.
    #[serde(default = "default_download_ttl")]
    pub download_url_ttl_secs: u64,
    /// Lifetime of share URLs in seconds.
    #[serde(default = "default_share_ttl")]
    pub share_url_ttl_secs: u64,
    /// Upper bound for a single store call in seconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,
}

fn default_metadata_backend() -> MetadataBackend {
    MetadataBackend::Sqlite
}

fn default_database_path() -> String {
    "data/scloud.db".to_string()
}

fn default_object_backend() -> ObjectBackend {
    ObjectBackend::Filesystem
}

fn default_object_path() -> String {
    "data/objects".to_string()
}

fn default_max_upload_size() -> u64 {
    100
}

fn default_download_ttl() -> u64 {
    3600 // 1 hour
}

fn default_share_ttl() -> u64 {
    86400 // 24 hours
}

fn default_store_timeout() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_backend: default_metadata_backend(),
            database_path: default_database_path(),
            object_backend: default_object_backend(),
            object_path: default_object_path(),
            url_signing_secret: String::new(),
            max_upload_size_mb: default_max_upload_size(),
            download_url_ttl_secs: default_download_ttl(),
            share_url_ttl_secs: default_share_ttl(),
            store_timeout_secs: default_store_timeout(),
        }
    }
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty logs to stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/scloud.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ScloudError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ScloudError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SCLOUD_JWT_SECRET`: token signing secret
    /// - `SCLOUD_URL_SIGNING_SECRET`: access URL signing secret
    /// - `SCLOUD_PORT`: listen port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("SCLOUD_JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(secret) = std::env::var("SCLOUD_URL_SIGNING_SECRET") {
            if !secret.is_empty() {
                self.storage.url_signing_secret = secret;
            }
        }
        if let Ok(port) = std::env::var("SCLOUD_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid SCLOUD_PORT"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Both signing secrets must be set, the public base URL must parse,
    /// and the size and lifetime limits must be non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ScloudError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via SCLOUD_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.storage.url_signing_secret.is_empty() {
            return Err(ScloudError::Config(
                "url_signing_secret is not set. \
                 Set it in config.toml or via SCLOUD_URL_SIGNING_SECRET environment variable."
                    .to_string(),
            ));
        }
        url::Url::parse(&self.server.public_base_url)
            .map_err(|e| ScloudError::Config(format!("invalid public_base_url: {e}")))?;
        if self.storage.max_upload_size_mb == 0 {
            return Err(ScloudError::Config(
                "max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.storage.download_url_ttl_secs == 0 || self.storage.share_url_ttl_secs == 0 {
            return Err(ScloudError::Config(
                "access URL lifetimes must be greater than 0".to_string(),
            ));
        }
        if self.storage.store_timeout_secs == 0 {
            return Err(ScloudError::Config(
                "store_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
