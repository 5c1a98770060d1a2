//! Error types for the link graph and notes.

use lectern_refs::RefError;
use lectern_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    /// A side of the link (or a note anchor) is not a valid citation.
    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The same pair of refs is already linked.
    #[error("this connection already exists: {0} - {1}")]
    Duplicate(String, String),

    /// A link between narrower refs inside the new link's sides exists.
    #[error("a more precise link already exists: {0} - {1}")]
    MorePrecise(String, String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Derivation was asked of a ref that cannot produce links.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl LinkError {
    /// True for the two duplicate-suppression rejections.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, LinkError::Duplicate(..) | LinkError::MorePrecise(..))
    }
}

pub type LinkResult<T> = Result<T, LinkError>;
