//! Foundation types for Lectern.
//!
//! This crate provides the data model shared by every other Lectern crate:
//! the per-work metadata record, the jagged text tree that stores a work's
//! content, stored text versions, and the link and note records anchored to
//! canonical citation strings.
//!
//! # Key Types
//!
//! - [`WorkIndex`]: Title variants, section hierarchy, categories, aliases
//! - [`TextTree`]: Recursive `Leaf | Node` jagged array of text segments
//! - [`VersionedText`]: One stored document per (work, language, version)
//! - [`Link`]: Typed edge between two canonical ref strings
//! - [`Note`]: User annotation anchored to a canonical ref string

pub mod error;
pub mod index;
pub mod link;
pub mod note;
pub mod text;
pub mod tree;

pub use error::TypeError;
pub use index::{Alias, CommentaryTarget, WorkIndex, BASE_TEXT_CATEGORIES};
pub use link::{Link, LinkId};
pub use note::{Note, NoteId, UserId};
pub use text::{Language, VersionKey, VersionStatus, VersionedText};
pub use tree::TextTree;
