//! Error types for idiom-polish.
//!
//! Only [`PolishError::InvalidInput`] ever reaches an HTTP caller. Every other
//! variant is recovered inside the orchestrator and turned into a degraded
//! document, or (for [`PolishError::Config`]) stops the process at startup.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum PolishError {
    /// The request itself is unusable (empty text).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote model call failed (transport, status, or response shape).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The artifact store could not be opened or queried.
    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias using [`PolishError`].
pub type Result<T> = std::result::Result<T, PolishError>;

impl From<rusqlite::Error> for PolishError {
    fn from(err: rusqlite::Error) -> Self {
        PolishError::Store(err.to_string())
    }
}
