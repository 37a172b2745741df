//! Error types for the blog API client.
//!
//! # Design
//! `NotFound` and `Http` display only their message, which is either the
//! server's error text or the operation's fixed failure string, so a UI can
//! show `err.to_string()` as is. The status code stays available for callers
//! that branch on it.

use thiserror::Error;

/// Errors returned by the session storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors returned by `BlogClient`, `BlogApi` and the helpers around them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server returned 404.
    #[error("{message}")]
    NotFound { message: String },

    /// The server returned a non-2xx status other than 404.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body did not decode into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The operation needs a logged-in session and none is stored.
    #[error("login required")]
    Unauthenticated,

    /// The current session does not own the post.
    #[error("{0}")]
    Forbidden(String),

    /// Local form validation failed before any request was built.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
