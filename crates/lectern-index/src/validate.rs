//! Field-level normalization and validation of index records.
//!
//! Checks that need the rest of the registry (title uniqueness) live on
//! [`IndexRegistry`](crate::IndexRegistry).

use lectern_types::WorkIndex;

use crate::error::{IndexError, IndexResult};
use crate::registry::normalize_title;

const TITLE_FORBIDDEN: &[char] = &['.', '-', '\\', '/'];
const CATEGORY_FORBIDDEN: &[char] = &['.', '-'];

/// Upper-case the first letter of the title and each variant, and make sure
/// the primary title is listed among the variants.
pub fn normalize_index(mut index: WorkIndex) -> WorkIndex {
    index.title = normalize_title(&index.title);
    index.title_variants = index
        .title_variants
        .iter()
        .map(|v| normalize_title(v))
        .collect();
    if !index.title_variants.contains(&index.title) {
        index.title_variants.push(index.title.clone());
    }
    index
}

/// Validate required fields and forbidden characters.
pub fn validate_fields(index: &WorkIndex) -> IndexResult<()> {
    if index.title.trim().is_empty() {
        return Err(IndexError::Invalid(
            "text index is missing a required field: title".into(),
        ));
    }
    if index.categories.is_empty() {
        return Err(IndexError::Invalid(
            "categories field must be a non empty list of strings".into(),
        ));
    }
    if index.section_names.is_empty() {
        return Err(IndexError::Invalid(
            "sectionNames field must be a non empty list of strings".into(),
        ));
    }
    if index.title.contains(TITLE_FORBIDDEN) {
        return Err(IndexError::Invalid(
            "text title may not contain periods, hyphens or slashes".into(),
        ));
    }
    if index.categories.iter().any(|c| c.contains(CATEGORY_FORBIDDEN)) {
        return Err(IndexError::Invalid(
            "categories may not contain periods or hyphens".into(),
        ));
    }
    if index.section_names.iter().any(|s| s.contains(TITLE_FORBIDDEN)) {
        return Err(IndexError::Invalid(
            "text structure names may not contain periods, hyphens or slashes".into(),
        ));
    }
    Ok(())
}
