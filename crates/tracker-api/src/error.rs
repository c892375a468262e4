//! Error type for remote service calls.

use thiserror::Error;

/// Failure modes of a single request attempt.
///
/// No variant implies a retry happened: every call is exactly one attempt.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not decode into the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The sentinel series type cannot be sent to the service
    #[error("unsupported series type")]
    UnsupportedType,
}
