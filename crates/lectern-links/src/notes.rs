//! User notes anchored to refs.
//!
//! Notes belong to their owner. Only public notes are reported to the
//! change history.

use std::sync::Arc;

use tracing::{debug, info, warn};

use lectern_refs::{covers, Ref, RefParser};
use lectern_store::{ref_has_prefix, ChangeKind, ChangeRecord, HistoryRecorder, NoteStore, StoreResult};
use lectern_types::{Note, NoteId, UserId};

use crate::error::{LinkError, LinkResult};
use crate::format::AnnotatedNote;

/// Which notes a query should return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteFilter<'a> {
    /// Include everyone's public notes.
    pub public: bool,
    /// Include this user's own notes, public or not.
    pub owner: Option<&'a UserId>,
}

impl NoteFilter<'_> {
    fn admits(&self, note: &Note) -> bool {
        (self.public && note.public) || self.owner == Some(&note.owner)
    }
}

pub struct NoteBook {
    parser: Arc<RefParser>,
    notes: Arc<dyn NoteStore>,
    history: Arc<dyn HistoryRecorder>,
}

impl NoteBook {
    pub fn new(
        parser: Arc<RefParser>,
        notes: Arc<dyn NoteStore>,
        history: Arc<dyn HistoryRecorder>,
    ) -> Self {
        Self {
            parser,
            notes,
            history,
        }
    }

    pub fn get(&self, id: NoteId) -> LinkResult<Option<Note>> {
        Ok(self.notes.get(id)?)
    }

    /// Create or update a note owned by `actor`.
    ///
    /// Updating requires the note to exist and to belong to `actor`; creating
    /// requires its id to be unused.
    pub fn save(&self, mut note: Note, actor: &UserId, update: bool) -> LinkResult<Note> {
        note.anchor = self.parser.norm_ref(&note.anchor, true, 0)?;
        note.owner = actor.clone();

        let previous = self.notes.get(note.id)?;
        let kind = match (&previous, update) {
            (Some(prev), true) if prev.owner == *actor => ChangeKind::EditNote,
            (_, true) => return Err(LinkError::NotFound(format!("note {}", note.id))),
            (Some(_), false) => {
                return Err(LinkError::Invalid(format!("note {} already exists", note.id)))
            }
            (None, false) => ChangeKind::AddNote,
        };

        self.notes.put(note.clone())?;
        if note.public || previous.as_ref().is_some_and(|p| p.public) {
            let mut change = ChangeRecord::new(kind, note.anchor.clone()).by(Some(actor)).with_new(&note);
            if let Some(prev) = &previous {
                change = change.and_then(|c| c.with_old(prev));
            }
            self.record(change);
        }
        debug!(id = %note.id, anchor = %note.anchor, public = note.public, "saved note");
        Ok(note)
    }

    pub fn delete(&self, id: NoteId, actor: &UserId) -> LinkResult<Note> {
        let note = self
            .notes
            .get(id)?
            .filter(|n| n.owner == *actor)
            .ok_or_else(|| LinkError::NotFound(format!("note {id}")))?;
        self.notes.delete(id)?;
        if note.public {
            self.record(
                ChangeRecord::new(ChangeKind::DeleteNote, note.anchor.clone())
                    .by(Some(actor))
                    .with_old(&note),
            );
        }
        debug!(%id, "deleted note");
        Ok(note)
    }

    /// Notes anchored inside `r` that `filter` admits, labeled for the
    /// filter's owner.
    pub fn query(&self, r: &Ref, filter: NoteFilter<'_>) -> LinkResult<Vec<AnnotatedNote>> {
        if !filter.public && filter.owner.is_none() {
            return Ok(Vec::new());
        }
        let prefix = match (r.sections.first(), r.to_sections.first()) {
            (Some(a), Some(b)) if a == b => lectern_refs::top_section(r).canonical(),
            _ => r.book.clone(),
        };

        let mut out = Vec::new();
        for note in self.notes.touching(&prefix)? {
            if !filter.admits(&note) {
                continue;
            }
            let anchor = match self.parser.parse(&note.anchor, false) {
                Ok(anchor) => anchor,
                Err(e) => {
                    warn!(id = %note.id, anchor = %note.anchor, error = %e, "skipping note with unparsable anchor");
                    continue;
                }
            };
            if covers(r, &anchor) {
                out.push(AnnotatedNote::new(&note, &anchor, filter.owner));
            }
        }
        Ok(out)
    }

    /// Re-anchor notes on work `old` to `new`.
    pub fn rename_title(&self, old: &str, new: &str) -> LinkResult<usize> {
        let mut changed = 0;
        for mut note in self.notes.touching(old)? {
            if ref_has_prefix(&note.anchor, old) {
                note.anchor = format!("{new}{}", &note.anchor[old.len()..]);
                self.notes.put(note)?;
                changed += 1;
            }
        }
        info!(old, new, changed, "renamed title in notes");
        Ok(changed)
    }

    pub fn remove_work(&self, title: &str) -> LinkResult<usize> {
        let doomed = self.notes.touching(title)?;
        for note in &doomed {
            self.notes.delete(note.id)?;
        }
        Ok(doomed.len())
    }

    fn record(&self, change: StoreResult<ChangeRecord>) {
        if let Err(e) = change.and_then(|c| self.history.record(c)) {
            warn!(error = %e, "failed to record note history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::notebook;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn private_notes_skip_history() {
        let (book, history) = notebook();
        let me = user("1");
        let note = book.save(Note::new("Gen 1:1", me.clone(), "private"), &me, false).unwrap();
        assert_eq!(note.anchor, "Genesis 1:1");
        assert!(history.is_empty());

        book.save(Note::new("Genesis 1:2", me.clone(), "shared").public(), &me, false)
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.records()[0].kind, ChangeKind::AddNote);
    }

    #[test]
    fn update_requires_existing_owned_note() {
        let (book, _) = notebook();
        let me = user("1");
        let them = user("2");
        let stray = Note::new("Genesis 1:1", me.clone(), "x");
        assert!(matches!(book.save(stray, &me, true), Err(LinkError::NotFound(_))));

        let mut mine = book.save(Note::new("Genesis 1:1", me.clone(), "v1"), &me, false).unwrap();
        mine.text = "v2".into();
        assert!(book.save(mine.clone(), &them, true).is_err());
        book.save(mine.clone(), &me, true).unwrap();
        assert_eq!(book.get(mine.id).unwrap().unwrap().text, "v2");
    }

    #[test]
    fn insert_cannot_overwrite_another_users_note() {
        let (book, history) = notebook();
        let alice = user("alice");
        let mallory = user("mallory");
        let note = book
            .save(Note::new("Genesis 1:1", alice.clone(), "original").public(), &alice, false)
            .unwrap();

        let mut forged = note.clone();
        forged.text = "defaced".into();
        assert!(matches!(book.save(forged, &mallory, false), Err(LinkError::Invalid(_))));

        let stored = book.get(note.id).unwrap().unwrap();
        assert_eq!(stored.owner, alice);
        assert_eq!(stored.text, "original");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn visibility_rules() {
        let (book, _) = notebook();
        let me = user("1");
        let them = user("2");
        book.save(Note::new("Genesis 1:1", me.clone(), "mine"), &me, false).unwrap();
        let mut theirs = Note::new("Genesis 1:2", them.clone(), "theirs").public();
        theirs.title = "T".into();
        book.save(theirs, &them, false).unwrap();
        book.save(Note::new("Genesis 1:3", them.clone(), "hidden"), &them, false).unwrap();

        let r = book.parser.parse("Genesis 1", false).unwrap();
        let texts = |filter| -> Vec<String> {
            let mut t: Vec<String> = book.query(&r, filter).unwrap().into_iter().map(|n| n.text).collect();
            t.sort();
            t
        };

        assert_eq!(texts(NoteFilter { public: true, owner: Some(&me) }), vec!["T - theirs", "mine"]);
        assert_eq!(texts(NoteFilter { public: true, owner: None }), vec!["T - theirs"]);
        assert_eq!(texts(NoteFilter { public: false, owner: Some(&me) }), vec!["mine"]);
        assert!(texts(NoteFilter { public: false, owner: None }).is_empty());
    }

    #[test]
    fn delete_only_by_owner() {
        let (book, history) = notebook();
        let me = user("1");
        let note = book.save(Note::new("Genesis 1:1", me.clone(), "n").public(), &me, false).unwrap();
        assert!(book.delete(note.id, &user("2")).is_err());
        book.delete(note.id, &me).unwrap();
        assert_eq!(history.records().last().unwrap().kind, ChangeKind::DeleteNote);
    }

    #[test]
    fn rename_moves_anchors() {
        let (book, _) = notebook();
        let me = user("1");
        book.save(Note::new("Job 3:4", me.clone(), "n"), &me, false).unwrap();
        assert_eq!(book.rename_title("Job", "Iyov").unwrap(), 1);
        assert_eq!(book.remove_work("Iyov").unwrap(), 1);
    }
}
