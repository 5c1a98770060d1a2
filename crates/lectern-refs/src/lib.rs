//! Citation grammar and ref algebra for Lectern.
//!
//! A citation such as `"Genesis 1:2-5"`, `"Shabbat 13a:3-14"`,
//! `"Rashi on Genesis 1:2:3"`, or `"בראשית א ב"` is parsed into a [`Ref`]:
//! a canonical title plus a closed range of 1-based section numbers. The
//! algebra then answers the questions storage and linking need: is this ref
//! spanning, what are its pieces, does one ref contain another, and what are
//! the neighboring sections.
//!
//! # Key Types
//!
//! - [`RefParser`]: Parses citations against an [`lectern_index::IndexRegistry`]
//! - [`Ref`]: Resolved coordinate with canonical `Display`
//! - [`LengthLookup`]: Injected capability reporting stored section sizes
//! - [`RefError`]: Parse and range errors

pub mod algebra;
pub mod daf;
pub mod error;
pub mod hebrew;
pub mod hebrew_grammar;
pub mod navigation;
pub mod parser;
pub mod scan;
pub mod types;

#[cfg(test)]
mod test_support;

pub use algebra::{covers, is_spanning, range_expand, section_level, split_span, top_section, url_form, widen};
pub use daf::{daf_to_section, parse_daf, parse_daf_section, section_to_daf, section_to_daf_he, Amud};
pub use error::{RefError, RefResult};
pub use hebrew::{contains_hebrew, decode_hebrew_numeral, encode_hebrew_numeral};
pub use navigation::{next_section, prev_section, LengthLookup, NoLengths};
pub use parser::{normalize_citation, RefParser};
pub use scan::citations_in_text;
pub use types::{Ref, Shorthand};
