//! Work index registry for Lectern.
//!
//! Holds every [`WorkIndex`](lectern_types::WorkIndex) and answers the
//! question "which work does this title mean?". Resolution is exact-variant
//! first, then the compound `"<Commentator> on <Base>"` form, which is
//! synthesized on the fly. Results are memoized until the next mutation.
//!
//! # Key Types
//!
//! - [`IndexRegistry`] -- Thread-safe registry with a generation counter
//! - [`IndexPatch`] -- Partial update merged into an existing record
//! - [`IndexError`] -- Validation and lookup failures

pub mod error;
pub mod patch;
pub mod registry;
pub mod validate;

pub use error::{IndexError, IndexResult};
pub use patch::IndexPatch;
pub use registry::{normalize_title, IndexRegistry};
pub use validate::{normalize_index, validate_fields};
