use wiki_core::error::CoreError;

/// Error type for the persistence-backed helpers.
///
/// Wraps [`CoreError`] for domain errors and adds storage and configuration
/// failures.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    /// A domain-level error from `wiki_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for helper return values.
pub type HelperResult<T> = Result<T, HelperError>;
