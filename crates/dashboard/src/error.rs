//! Unified error handling for the dashboard client.
//!
//! Every fallible operation returns [`ApiError`], which separates the four
//! failure classes the UI reacts to differently: rejected credentials,
//! authorization failures (session expired or insufficient role),
//! client-side validation, and transport/backend failures. Nothing is
//! retried automatically; callers surface errors through the notifier and
//! leave retries to the user.

use thiserror::Error;

/// Application-level error type for the dashboard client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login rejected by the backend; the local session stays cleared.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backend reported the session as unauthorized (401). The session
    /// manager owns the teardown; the transport only raises this.
    #[error("Session unauthorized")]
    Unauthorized,

    /// Valid session but insufficient role. Raised client-side before any
    /// request is issued, or mapped from a backend 403.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Client-side validation failure; no request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response from the backend.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The backend's envelope reported failure or carried no payload.
    #[error("Envelope error: {0}")]
    Envelope(String),

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Whether this error must tear the session down.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
