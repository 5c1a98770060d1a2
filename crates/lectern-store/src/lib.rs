//! Document collections and external collaborators for Lectern.
//!
//! The engine assumes a document store with four logical collections (work
//! indices live in `lectern-index`; texts, links, and notes live here) plus
//! three narrow collaborators it reports to but never depends on.
//!
//! # Collections
//!
//! - [`TextStore`] -- versioned texts keyed by (title, language, version)
//! - [`LinkStore`] -- links keyed by id, queried by ref prefix
//! - [`NoteStore`] -- notes keyed by id, queried by anchor prefix
//!
//! # Collaborators
//!
//! - [`HistoryRecorder`] -- audit trail of every mutation
//! - [`SearchIndexer`] -- fire-and-forget re-index requests
//! - [`Authorizer`] -- privilege check for locked versions
//!
//! Every trait has an in-memory (or no-op) implementation for tests and
//! embedding.

pub mod auth;
pub mod error;
pub mod history;
pub mod indexer;
pub mod memory;
pub mod traits;

pub use auth::{Authorizer, StaticAuthorizer};
pub use error::{StoreError, StoreResult};
pub use history::{ChangeKind, ChangeRecord, HistoryRecorder, InMemoryHistory, NoopHistory};
pub use indexer::{ChannelIndexer, IndexJob, NoopIndexer, SearchIndexer};
pub use memory::{InMemoryLinkStore, InMemoryNoteStore, InMemoryTextStore};
pub use traits::{ref_has_prefix, LinkStore, NoteStore, TextStore};
