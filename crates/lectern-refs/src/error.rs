//! Error types for citation parsing.

use lectern_index::IndexError;
use thiserror::Error;

/// Errors that can occur while parsing or manipulating a citation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefError {
    /// No registered work matches the title or alias.
    #[error("unknown text: '{0}'")]
    UnknownWork(String),

    /// More than one range separator, or a range that ends before it starts.
    #[error("couldn't understand ref (malformed range): {0}")]
    MalformedRange(String),

    /// A commentator was cited without the work it comments on.
    #[error("please specify a text that {0} comments on")]
    NeedsBaseText(String),

    /// A section or daf token is not a valid number.
    #[error("couldn't understand text sections: {0}")]
    UnparsableSection(String),

    /// The top-level section exceeds the work's declared length.
    #[error("{book} only has {length} {unit}s")]
    OutOfBounds {
        book: String,
        length: u32,
        unit: String,
    },

    /// A Hebrew citation form the grammar refuses to guess at.
    #[error("unsupported Hebrew reference: {0}")]
    UnsupportedHebrewForm(String),

    /// The citation scanner could not build its pattern from the known titles.
    #[error("citation pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Registry failure other than an unknown title.
    #[error(transparent)]
    Index(IndexError),
}

impl From<IndexError> for RefError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::UnknownWork(name) => RefError::UnknownWork(name),
            other => RefError::Index(other),
        }
    }
}

/// Convenience alias for ref results.
pub type RefResult<T> = Result<T, RefError>;
