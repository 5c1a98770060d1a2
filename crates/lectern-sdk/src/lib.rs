//! High-level SDK for Lectern.
//!
//! [`Library`] ties the crates together: it parses citations, assembles
//! text from every stored version of a work (merging partial versions by
//! coverage), saves text with sanitizing and lock checks, derives links,
//! and keeps the text cache consistent across writes and maintenance.
//!
//! # Key Types
//!
//! - [`Library`]: Every read, write, and maintenance operation
//! - [`LibraryBuilder`]: Plugs in stores and collaborators
//! - [`TextRequest`] / [`ResolvedText`]: A fetch and its response
//! - [`TextSubmission`]: Text posted to a ref
//! - [`LibraryConfig`]: Cache, derivation, and sanitizing settings
//! - [`SdkError`] / [`ErrorKind`]: Failures and their caller-facing kind

pub mod config;
pub mod error;
pub mod library;
pub mod maintenance;
pub mod request;
pub mod sanitize;
pub mod save;
mod text;

#[cfg(test)]
mod test_support;

pub use config::{CacheConfig, LibraryConfig};
pub use error::{ErrorKind, SdkError, SdkResult};
pub use library::{Library, LibraryBuilder};
pub use request::{ResolvedText, TextRequest, TextSubmission, VersionSummary};
pub use sanitize::Sanitizer;

// Re-export key types
pub use lectern_index::IndexPatch;
pub use lectern_links::{AnnotatedLink, AnnotatedNote, NoteFilter};
pub use lectern_refs::Ref;
pub use lectern_types::{
    Language, Link, LinkId, Note, NoteId, TextTree, UserId, VersionStatus, VersionedText,
    WorkIndex,
};
