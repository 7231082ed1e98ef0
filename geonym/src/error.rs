//! Error types for geonym.

use thiserror::Error;

/// Result type for geonym operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for geonym operations.
///
/// Only analyzer construction and structural failures surface here. A
/// heuristic that does not apply is `None`, the entity cap and host
/// cancellation are reported through [`crate::Outcome`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Token stream or entity store misuse.
    #[error(transparent)]
    Core(#[from] geonym_core::Error),

    /// Collaborator initialization failed (missing, empty or malformed lexicon).
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a lexicon error.
    pub fn lexicon(msg: impl Into<String>) -> Self {
        Error::Lexicon(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
