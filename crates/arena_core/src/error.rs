//! Error types for the arena simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Level or arena configuration rejected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Level number outside the campaign table.
    #[error("Invalid level number: {0}")]
    InvalidLevel(u32),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Snapshot serialization or deserialization failed.
    #[error("Snapshot error: {0}")]
    SnapshotError(String),
}
