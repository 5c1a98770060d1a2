use lectern_types::{Language, Link, LinkId, Note, NoteId, VersionKey, VersionedText};

use crate::error::StoreResult;

/// True if `reference` is `prefix` itself or a ref nested under it.
///
/// `"Genesis 1"` is nested under `"Genesis"`, but `"Genesis 10"` is not
/// under `"Genesis 1"` and `"Genesis Rabbah 2"` is not under `"Genesis"`.
pub fn ref_has_prefix(reference: &str, prefix: &str) -> bool {
    let Some(rest) = reference.strip_prefix(prefix) else {
        return false;
    };
    rest.is_empty()
        || rest.starts_with(':')
        || rest
            .strip_prefix(' ')
            .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
}

/// Collection of stored text versions, one document per
/// (title, language, version title).
///
/// Implementations must hand out versions of a title ordered by descending
/// priority (unset priority last), then by insertion order. That order is
/// the merge precedence.
pub trait TextStore: Send + Sync {
    fn get(&self, key: &VersionKey) -> StoreResult<Option<VersionedText>>;

    /// Insert or replace by key. A new document is assigned the next
    /// insertion sequence number; a replaced one keeps its own.
    fn put(&self, text: VersionedText) -> StoreResult<VersionedText>;

    /// Returns `true` if the document existed.
    fn delete(&self, key: &VersionKey) -> StoreResult<bool>;

    /// Every version of `title`, optionally restricted to one language, in
    /// merge precedence order.
    fn versions(&self, title: &str, language: Option<Language>) -> StoreResult<Vec<VersionedText>>;

    /// Distinct titles with at least one stored version.
    fn titles(&self) -> StoreResult<Vec<String>>;

    /// Move every version of `old` under `new`. Returns the number moved.
    fn rename_title(&self, old: &str, new: &str) -> StoreResult<usize> {
        let versions = self.versions(old, None)?;
        for mut text in versions.iter().cloned() {
            self.delete(&text.key())?;
            text.title = new.to_string();
            self.put(text)?;
        }
        Ok(versions.len())
    }
}

/// Collection of links between canonical ref strings.
pub trait LinkStore: Send + Sync {
    fn get(&self, id: LinkId) -> StoreResult<Option<Link>>;

    /// Insert or replace by id.
    fn put(&self, link: Link) -> StoreResult<()>;

    fn delete(&self, id: LinkId) -> StoreResult<bool>;

    /// Links with at least one side equal to or nested under `prefix`.
    fn touching(&self, prefix: &str) -> StoreResult<Vec<Link>>;

    fn all(&self) -> StoreResult<Vec<Link>>;
}

/// Collection of user notes.
pub trait NoteStore: Send + Sync {
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;

    /// Insert or replace by id.
    fn put(&self, note: Note) -> StoreResult<()>;

    fn delete(&self, id: NoteId) -> StoreResult<bool>;

    /// Notes anchored at or under `prefix`.
    fn touching(&self, prefix: &str) -> StoreResult<Vec<Note>>;

    fn all(&self) -> StoreResult<Vec<Note>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_respects_boundaries() {
        assert!(ref_has_prefix("Genesis 1:4", "Genesis 1"));
        assert!(ref_has_prefix("Genesis 1", "Genesis"));
        assert!(ref_has_prefix("Genesis", "Genesis"));
        assert!(!ref_has_prefix("Genesis 10", "Genesis 1"));
        assert!(!ref_has_prefix("Genesisx 1", "Genesis"));
        assert!(!ref_has_prefix("Genesis Rabbah 2:1", "Genesis"));
        assert!(ref_has_prefix("Shabbat 13a:4", "Shabbat 13a"));
    }
}
