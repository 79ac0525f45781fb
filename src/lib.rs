//! SCloud - user-scoped file storage service
//!
//! Accounts sign in with an email and password and receive an identity
//! token. Each account owns a private set of files, reachable through
//! signed, time-limited access URLs.

pub mod auth;
pub mod config;
#[cfg(feature = "sqlite")]
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod store;
pub mod web;

pub use auth::{
    delete_account, get_profile, hash_password, login, register, update_profile,
    validate_password, verify_password, verify_session, AuthError, AuthSession, IdentityClaims,
    PasswordError, ProfileUpdate, RegistrationRequest, TokenService, ValidationError,
};
pub use config::Config;
#[cfg(feature = "sqlite")]
pub use db::Database;
pub use error::{Result, ScloudError};
pub use file::{FileService, UploadRequest};
pub use store::{
    FileRecord, MemoryMetadataStore, MemoryObjectStore, MetadataStore, ObjectStore, PublicUser,
    UrlSigner,
};
pub use web::{create_router, AppState, WebServer};
