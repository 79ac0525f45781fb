//! Web API module for SCloud.
//!
//! This module provides the REST API: authentication, profile and file
//! endpoints under `/api`, plus the signed `/objects` download route.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
