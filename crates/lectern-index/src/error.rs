//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// No registered title, variant, or commentary form matches.
    #[error("unknown text: '{0}'")]
    UnknownWork(String),

    /// A record to update or rename does not exist.
    #[error("no index record found for {0}")]
    NotFound(String),

    /// A record failed field validation.
    #[error("invalid index: {0}")]
    Invalid(String),

    /// A title variant is already claimed by another work.
    #[error("a text called \"{0}\" already exists")]
    DuplicateTitle(String),

    /// Internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
