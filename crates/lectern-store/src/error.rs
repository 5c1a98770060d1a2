/// Errors from document collections and collaborators.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record addressed by key or id does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write would collide with an existing record.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A collection lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// A record could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Poisoned(e.to_string())
}
