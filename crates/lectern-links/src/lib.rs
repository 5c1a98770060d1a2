//! Link graph and notes for Lectern.
//!
//! Links are undirected edges between two canonical ref strings; notes are
//! user annotations anchored to one. Both are queried by containment: asking
//! for `"Genesis 1"` returns everything anchored anywhere inside chapter 1.
//!
//! # Key Types
//!
//! - [`LinkGraph`] -- save with duplicate suppression, delete, query, derive
//! - [`NoteBook`] -- owner-scoped notes with public/private visibility
//! - [`AnnotatedLink`] / [`AnnotatedNote`] -- query results oriented from
//!   the queried side
//! - [`TextSource`] -- how the graph reads stored text without owning it

pub mod derive;
pub mod error;
pub mod format;
pub mod graph;
pub mod notes;

#[cfg(test)]
mod test_support;

pub use error::{LinkError, LinkResult};
pub use format::{AnnotatedLink, AnnotatedNote};
pub use graph::{LinkGraph, SectionText, TextSource};
pub use notes::{NoteBook, NoteFilter};
