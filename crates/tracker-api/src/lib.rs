//! HTTP client for the remote catalogue/tracking service.
//!
//! Provides free-text series search and library-entry push, implementing the
//! `shared` service traits over a JSON:API-style endpoint.

pub mod client;
pub mod error;
pub mod rate_limiter;
pub mod types;

pub use client::TrackerClient;
pub use error::ApiError;
pub use rate_limiter::RateLimiter;
