use serde::Serialize;
use thiserror::Error;

use lectern_cache::CacheError;
use lectern_index::IndexError;
use lectern_links::LinkError;
use lectern_merge::MergeError;
use lectern_refs::RefError;
use lectern_store::StoreError;

/// Caller-facing classification of every failure the library reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UnknownWork,
    MalformedRange,
    AmbiguousCommentaryTarget,
    UnparsableSection,
    OutOfBounds,
    StructureMismatch,
    DuplicateOrMorePreciseLink,
    LockedVersion,
    NotFound,
    UnsupportedHebrewForm,
    Invalid,
    Internal,
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("resize error: {0}")]
    Merge(#[from] MergeError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(
        "text structure mismatch: the stored depth of {book} is {expected}, \
         but the text posted to {reference} implies a depth of {implied}"
    )]
    StructureMismatch {
        book: String,
        reference: String,
        expected: usize,
        implied: usize,
    },

    #[error("this text has been locked against further edits: {0}")]
    Locked(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    Invalid(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Ref(e) => ref_kind(e),
            SdkError::Index(e) => index_kind(e),
            SdkError::Store(e) => store_kind(e),
            SdkError::Link(e) => match e {
                LinkError::Ref(e) => ref_kind(e),
                LinkError::Store(e) => store_kind(e),
                LinkError::Duplicate(..) | LinkError::MorePrecise(..) => {
                    ErrorKind::DuplicateOrMorePreciseLink
                }
                LinkError::NotFound(_) => ErrorKind::NotFound,
                LinkError::Invalid(_) => ErrorKind::Invalid,
            },
            SdkError::Merge(_) | SdkError::Invalid(_) | SdkError::Config(_) => ErrorKind::Invalid,
            SdkError::StructureMismatch { .. } => ErrorKind::StructureMismatch,
            SdkError::Locked(_) => ErrorKind::LockedVersion,
            SdkError::NotFound(_) => ErrorKind::NotFound,
            SdkError::Cache(_) | SdkError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

fn ref_kind(e: &RefError) -> ErrorKind {
    match e {
        RefError::UnknownWork(_) => ErrorKind::UnknownWork,
        RefError::MalformedRange(_) => ErrorKind::MalformedRange,
        RefError::NeedsBaseText(_) => ErrorKind::AmbiguousCommentaryTarget,
        RefError::UnparsableSection(_) => ErrorKind::UnparsableSection,
        RefError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
        RefError::UnsupportedHebrewForm(_) => ErrorKind::UnsupportedHebrewForm,
        RefError::Pattern(_) => ErrorKind::Internal,
        RefError::Index(e) => index_kind(e),
    }
}

fn index_kind(e: &IndexError) -> ErrorKind {
    match e {
        IndexError::UnknownWork(_) => ErrorKind::UnknownWork,
        IndexError::NotFound(_) => ErrorKind::NotFound,
        IndexError::Invalid(_) | IndexError::DuplicateTitle(_) => ErrorKind::Invalid,
        IndexError::Poisoned(_) => ErrorKind::Internal,
    }
}

fn store_kind(e: &StoreError) -> ErrorKind {
    match e {
        StoreError::NotFound(_) => ErrorKind::NotFound,
        StoreError::Conflict(_) => ErrorKind::Invalid,
        StoreError::Poisoned(_) | StoreError::Serialization(_) => ErrorKind::Internal,
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_source_error() {
        let e: SdkError = RefError::NeedsBaseText("Rashi".into()).into();
        assert_eq!(e.kind(), ErrorKind::AmbiguousCommentaryTarget);

        let e: SdkError = LinkError::MorePrecise("a".into(), "b".into()).into();
        assert_eq!(e.kind(), ErrorKind::DuplicateOrMorePreciseLink);

        let e: SdkError = LinkError::Ref(RefError::UnknownWork("Foo".into())).into();
        assert_eq!(e.kind(), ErrorKind::UnknownWork);

        let e: SdkError = IndexError::DuplicateTitle("Gen".into()).into();
        assert_eq!(e.kind(), ErrorKind::Invalid);

        assert_eq!(SdkError::Locked("x".into()).kind(), ErrorKind::LockedVersion);
    }
}
