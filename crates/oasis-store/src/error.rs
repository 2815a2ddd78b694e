//! Error types for the remote store client.
//!
//! Every store call is all-or-nothing from the caller's point of view: it
//! either returns the committed result or one of these errors. Each variant
//! carries a human-readable cause that is passed through unchanged.

/// Errors that can occur talking to the remote store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request could not be completed (connect, timeout, TLS).
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("store rejected {operation} ({status}): {message}")]
    Rejected {
        /// The store operation that was refused.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Backend-supplied message.
        message: String,
    },

    /// The requested record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A payload could not be serialized or a response decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend answered successfully but the body was not usable.
    #[error("malformed store response: {0}")]
    Malformed(String),

    /// The client configuration is invalid.
    #[error("store configuration error: {0}")]
    Config(String),

    /// A failure scheduled on the in-memory backend.
    #[error("injected failure: {0}")]
    Injected(String),
}
