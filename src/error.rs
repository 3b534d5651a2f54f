//! Error types for the Gatelimit library.

use thiserror::Error;

/// Main error type for Gatelimit operations.
///
/// Rate-limit rejection is deliberately not represented here: it is the
/// ordinary outcome of a check and is returned as a
/// [`Decision`](crate::Decision) value, so the hot rejection path carries no
/// unwinding cost.
#[derive(Error, Debug)]
pub enum GatelimitError {
    /// Configuration-related errors; fatal at construction time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required identity was absent from a check request. Callers map this
    /// to a client-error response, distinct from rate-limit rejection.
    #[error("Missing identity for dimension '{dimension}'")]
    MissingIdentity {
        /// The configured dimension the caller supplied no identity for.
        dimension: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gatelimit operations.
pub type Result<T> = std::result::Result<T, GatelimitError>;
