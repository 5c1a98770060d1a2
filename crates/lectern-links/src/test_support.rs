//! Shared fixtures for unit tests.

use std::sync::Arc;

use lectern_index::IndexRegistry;
use lectern_refs::RefParser;
use lectern_store::{InMemoryHistory, InMemoryLinkStore, InMemoryNoteStore};
use lectern_types::WorkIndex;

use crate::graph::LinkGraph;
use crate::notes::NoteBook;

pub(crate) fn parser() -> Arc<RefParser> {
    let reg = IndexRegistry::new();
    let works = [
        WorkIndex::new("Genesis", &["Chapter", "Verse"], &["Tanach", "Torah"])
            .with_length(50)
            .with_variants(&["Gen"])
            .with_hebrew("בראשית", &[]),
        WorkIndex::new("Job", &["Chapter", "Verse"], &["Tanach", "Writings"]).with_length(42),
        WorkIndex::new("Psalms", &["Chapter", "Verse"], &["Tanach", "Writings"]).with_length(150),
        WorkIndex::new("Shabbat", &["Daf", "Line"], &["Talmud", "Bavli", "Seder Moed"])
            .with_length(157)
            .with_hebrew("שבת", &[]),
        WorkIndex::new("Rashi", &["Chapter", "Verse", "Comment"], &["Commentary"])
            .with_hebrew("רש\"י", &[]),
    ];
    for w in works {
        reg.save(w, None).unwrap();
    }
    Arc::new(RefParser::new(Arc::new(reg)))
}

pub(crate) fn graph() -> (LinkGraph, Arc<InMemoryHistory>) {
    let history = Arc::new(InMemoryHistory::new());
    let g = LinkGraph::new(parser(), Arc::new(InMemoryLinkStore::new()), history.clone());
    (g, history)
}

pub(crate) fn notebook() -> (NoteBook, Arc<InMemoryHistory>) {
    let history = Arc::new(InMemoryHistory::new());
    let book = NoteBook::new(parser(), Arc::new(InMemoryNoteStore::new()), history.clone());
    (book, history)
}
