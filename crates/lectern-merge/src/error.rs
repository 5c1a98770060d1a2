use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A resize would leave the work with no section levels.
    #[error("cannot resize from depth {from} to depth {to}")]
    InvalidDepth { from: usize, to: usize },

    /// Wrapping in place only adds levels.
    #[error("in-place resize can only add levels (delta {0})")]
    WrapRequiresUpsize(i64),
}

pub type MergeResult<T> = Result<T, MergeError>;
