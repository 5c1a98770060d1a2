//! Version merge engine for Lectern.
//!
//! Combines several partial versions of a section into a maximal-coverage
//! result with per-leaf provenance, and reshapes a work's stored text when
//! its section structure gains or loses a level.

pub mod coverage;
pub mod error;
pub mod resize;

pub use coverage::{merge_by_coverage, Merged};
pub use error::{MergeError, MergeResult};
pub use resize::{downsize, resize, resize_delta, upsize, wrap};
