//! Error types for geonym-core.

use thiserror::Error;

/// Result type for geonym-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for geonym-core operations.
///
/// Recognition itself never fails with an error: a heuristic that does not
/// apply yields `None`. These variants cover structural misuse of the token
/// stream and the entity store, and malformed reference data.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A span cannot be embedded (endpoints hidden, misordered, or partially
    /// overlapping an existing composite).
    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    /// A token id that the stream never issued.
    #[error("Unknown token: t{0}")]
    UnknownToken(usize),

    /// An entity id that the store never issued.
    #[error("Unknown entity: e{0}")]
    UnknownEntity(usize),

    /// Invalid input provided (e.g. malformed ontology entries).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A structural invariant failed to hold after a pass.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(msg: impl Into<String>) -> Self {
        Self::InvalidSpan(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invariant error.
    #[must_use]
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
