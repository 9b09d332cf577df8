//! Error types for the REST API boundary.

use thiserror::Error;

/// Result type alias for API adapter operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the HTTP API adapter.
///
/// Slice reducers never let these escape: every failure is converted into
/// the slice's `error` string field, and callers inspect that field
/// reactively. The variants exist so the adapter can classify responses
/// uniformly and so tests can assert on failure kinds.
///
/// The enum is `Clone` because response actions carry it through the effect
/// feedback loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, TLS, timeout).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// Missing or expired credential (HTTP 401).
    ///
    /// The surrounding collaborator is responsible for redirecting to
    /// authentication.
    #[error("Unauthorized - missing or expired credential")]
    Unauthorized,

    /// The server rejected the payload (HTTP 400/422).
    #[error("Request rejected: {0}")]
    ValidationRejected(String),

    /// The operation targeted a missing resource (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("Unexpected response (status {status}): {message}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// The response body could not be decoded as the expected JSON shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}
