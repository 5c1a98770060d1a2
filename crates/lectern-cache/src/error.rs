use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
