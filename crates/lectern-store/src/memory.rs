use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use lectern_types::{Language, Link, LinkId, Note, NoteId, VersionKey, VersionedText};

use crate::error::{poisoned, StoreResult};
use crate::traits::{ref_has_prefix, LinkStore, NoteStore, TextStore};

// ---------------------------------------------------------------------------
// Texts
// ---------------------------------------------------------------------------

/// In-memory text version collection.
#[derive(Debug, Default)]
pub struct InMemoryTextStore {
    docs: RwLock<BTreeMap<VersionKey, VersionedText>>,
    next_seq: AtomicU64,
}

impl InMemoryTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextStore for InMemoryTextStore {
    fn get(&self, key: &VersionKey) -> StoreResult<Option<VersionedText>> {
        Ok(self.docs.read().map_err(poisoned)?.get(key).cloned())
    }

    fn put(&self, mut text: VersionedText) -> StoreResult<VersionedText> {
        let key = text.key();
        let mut docs = self.docs.write().map_err(poisoned)?;
        text.seq = match docs.get(&key) {
            Some(existing) => existing.seq,
            None => self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        debug!(key = %key, seq = text.seq, "stored text version");
        docs.insert(key, text.clone());
        Ok(text)
    }

    fn delete(&self, key: &VersionKey) -> StoreResult<bool> {
        Ok(self.docs.write().map_err(poisoned)?.remove(key).is_some())
    }

    fn versions(&self, title: &str, language: Option<Language>) -> StoreResult<Vec<VersionedText>> {
        let docs = self.docs.read().map_err(poisoned)?;
        let mut found: Vec<VersionedText> = docs
            .values()
            .filter(|t| t.title == title && language.map_or(true, |l| t.language == l))
            .cloned()
            .collect();
        found.sort_by_key(|t| (Reverse(t.priority), t.seq));
        Ok(found)
    }

    fn titles(&self) -> StoreResult<Vec<String>> {
        let docs = self.docs.read().map_err(poisoned)?;
        let titles: BTreeSet<String> = docs.keys().map(|k| k.title.clone()).collect();
        Ok(titles.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// In-memory link collection. Iteration follows id order, which for
/// time-ordered ids is creation order.
#[derive(Debug, Default)]
pub struct InMemoryLinkStore {
    links: RwLock<BTreeMap<LinkId, Link>>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LinkStore for InMemoryLinkStore {
    fn get(&self, id: LinkId) -> StoreResult<Option<Link>> {
        Ok(self.links.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn put(&self, link: Link) -> StoreResult<()> {
        self.links.write().map_err(poisoned)?.insert(link.id, link);
        Ok(())
    }

    fn delete(&self, id: LinkId) -> StoreResult<bool> {
        Ok(self.links.write().map_err(poisoned)?.remove(&id).is_some())
    }

    fn touching(&self, prefix: &str) -> StoreResult<Vec<Link>> {
        let links = self.links.read().map_err(poisoned)?;
        Ok(links
            .values()
            .filter(|l| l.refs.iter().any(|r| ref_has_prefix(r, prefix)))
            .cloned()
            .collect())
    }

    fn all(&self) -> StoreResult<Vec<Link>> {
        Ok(self.links.read().map_err(poisoned)?.values().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// In-memory note collection.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<BTreeMap<NoteId, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for InMemoryNoteStore {
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.notes.read().map_err(poisoned)?.get(&id).cloned())
    }

    fn put(&self, note: Note) -> StoreResult<()> {
        self.notes.write().map_err(poisoned)?.insert(note.id, note);
        Ok(())
    }

    fn delete(&self, id: NoteId) -> StoreResult<bool> {
        Ok(self.notes.write().map_err(poisoned)?.remove(&id).is_some())
    }

    fn touching(&self, prefix: &str) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read().map_err(poisoned)?;
        Ok(notes
            .values()
            .filter(|n| ref_has_prefix(&n.anchor, prefix))
            .cloned()
            .collect())
    }

    fn all(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.read().map_err(poisoned)?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_types::{TextTree, UserId};

    fn version(title: &str, vt: &str, lang: Language) -> VersionedText {
        VersionedText::new(title, lang, vt, TextTree::segments(["a"]))
    }

    #[test]
    fn put_assigns_sequence_once() {
        let store = InMemoryTextStore::new();
        let first = store.put(version("Genesis", "JPS", Language::English)).unwrap();
        let second = store.put(version("Genesis", "KJV", Language::English)).unwrap();
        assert!(second.seq > first.seq);

        let replaced = store.put(version("Genesis", "JPS", Language::English)).unwrap();
        assert_eq!(replaced.seq, first.seq);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn versions_follow_priority_then_insertion() {
        let store = InMemoryTextStore::new();
        store.put(version("Genesis", "plain", Language::English)).unwrap();
        store
            .put(version("Genesis", "preferred", Language::English).with_priority(2))
            .unwrap();
        store.put(version("Genesis", "later", Language::English)).unwrap();
        store
            .put(version("Genesis", "Tanach", Language::Hebrew).with_priority(1))
            .unwrap();

        let en: Vec<String> = store
            .versions("Genesis", Some(Language::English))
            .unwrap()
            .into_iter()
            .map(|t| t.version_title)
            .collect();
        assert_eq!(en, vec!["preferred", "plain", "later"]);
        assert_eq!(store.versions("Genesis", None).unwrap().len(), 4);
        assert!(store.versions("Exodus", None).unwrap().is_empty());
    }

    #[test]
    fn rename_moves_every_version() {
        let store = InMemoryTextStore::new();
        store.put(version("Genesis", "JPS", Language::English)).unwrap();
        store.put(version("Genesis", "Tanach", Language::Hebrew)).unwrap();
        assert_eq!(store.rename_title("Genesis", "Bereshit").unwrap(), 2);
        assert!(store.versions("Genesis", None).unwrap().is_empty());
        assert_eq!(store.titles().unwrap(), vec!["Bereshit"]);
    }

    #[test]
    fn links_by_prefix() {
        let store = InMemoryLinkStore::new();
        let a = Link::new("Genesis 1:1", "Rashi on Genesis 1:1:1", "commentary");
        let b = Link::new("Genesis 10:1", "Job 3:3", "");
        store.put(a.clone()).unwrap();
        store.put(b.clone()).unwrap();

        let hits = store.touching("Genesis 1").unwrap();
        assert_eq!(hits, vec![a.clone()]);
        assert_eq!(store.touching("Genesis").unwrap().len(), 2);
        assert!(store.delete(a.id).unwrap());
        assert!(!store.delete(a.id).unwrap());
        assert_eq!(store.all().unwrap(), vec![b]);
    }

    #[test]
    fn notes_by_prefix() {
        let store = InMemoryNoteStore::new();
        let owner = UserId::new("u1").unwrap();
        let note = Note::new("Genesis 1:2", owner, "hovering");
        store.put(note.clone()).unwrap();
        assert_eq!(store.touching("Genesis 1").unwrap(), vec![note.clone()]);
        assert!(store.touching("Genesis 2").unwrap().is_empty());
        assert_eq!(store.get(note.id).unwrap(), Some(note));
    }
}
