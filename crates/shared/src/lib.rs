//! Shared library for the nekome series tracker.
//!
//! This crate provides common functionality used across the workspace:
//! - Configuration management
//! - Database access and the local series store
//! - The library repository (local cache + remote push)
//! - Publisher/subscriber events
//! - Service trait seams for the remote API
//! - Analytics consent storage
//! - Logging infrastructure

pub mod api;
pub mod config;
pub mod consent;
pub mod db;
pub mod events;
pub mod library;
pub mod logging;
pub mod models;
pub mod store;

// Re-export commonly used types
pub use api::{LibraryApi, SearchApi};
pub use config::Config;
pub use consent::ConsentStore;
pub use db::Database;
pub use events::{Publisher, Subscription};
pub use library::Library;
pub use logging::LogConfig;
pub use models::*;
pub use store::SeriesStore;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
