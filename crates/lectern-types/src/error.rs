use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// A text tree does not have the nesting depth its work declares.
    #[error("text structure mismatch: expected depth {expected}, got {actual}")]
    StructureMismatch { expected: usize, actual: usize },

    #[error("unknown language code: {0}")]
    InvalidLanguage(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
