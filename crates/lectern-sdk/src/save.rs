//! Writes: text, version status, links, notes, and index records.
//!
//! Every write reports to the change history (failures there only warn),
//! then invalidates the cached text it could have changed.

use tracing::{debug, info, warn};

use lectern_index::{normalize_index, validate_fields, IndexPatch};
use lectern_links::{AnnotatedLink, AnnotatedNote, NoteFilter, TextSource};
use lectern_refs::Ref;
use lectern_store::{ChangeKind, ChangeRecord, IndexJob, StoreResult};
use lectern_types::{
    Alias, Language, Link, LinkId, Note, NoteId, TextTree, UserId, VersionKey, VersionStatus,
    VersionedText, WorkIndex,
};

use crate::error::{SdkError, SdkResult};
use crate::library::{Library, TITLES_KEY};
use crate::request::TextSubmission;

impl Library {
    // ---- Text ----

    /// Write `submission` at `citation` into its version, creating the
    /// version if needed.
    ///
    /// The posted text must fill exactly the levels below the cited
    /// sections. Locked versions accept edits only from privileged users.
    pub fn save_text(
        &self,
        citation: &str,
        submission: TextSubmission,
        actor: Option<&UserId>,
    ) -> SdkResult<VersionedText> {
        let r = self.parser.parse(citation, false)?;
        if r.is_range() {
            return Err(SdkError::Invalid(format!("cannot save text to a range: {r}")));
        }
        let implied = r.sections.len() + submission.text.depth();
        if implied != r.depth() {
            return Err(SdkError::StructureMismatch {
                book: r.book.clone(),
                reference: r.canonical(),
                expected: r.depth(),
                implied,
            });
        }

        let mut text = submission.text;
        self.sanitizer.clean_tree(&mut text);

        let key = VersionKey::new(r.book.clone(), submission.language, submission.version_title);
        let existing = self.texts.get(&key)?;
        if existing.as_ref().is_some_and(|doc| doc.status.is_locked())
            && !self.auth.is_privileged(actor)
        {
            return Err(SdkError::Locked(key.to_string()));
        }

        let mut doc = existing.unwrap_or_else(|| {
            VersionedText::new(
                key.title.clone(),
                key.language,
                key.version_title.clone(),
                TextTree::default(),
            )
        });
        if !submission.version_source.is_empty() {
            doc.version_source = submission.version_source;
        }
        let old = doc.content.section(&r.sections, &r.sections);
        doc.content.set_at(&r.sections, text.clone(), r.depth());
        let saved = self.texts.put(doc)?;

        self.record(
            ChangeRecord::new(ChangeKind::EditText, r.canonical())
                .by(actor)
                .with_old(&old)
                .and_then(|c| c.with_new(&text)),
        );
        self.invalidate_section(&r);

        if self.config.derive_links_on_save {
            self.derive_links(&r, &text);
        }
        self.invalidate_linked(&r);

        if self.config.search_index_on_save {
            self.indexer
                .notify(IndexJob::new(r.canonical(), &saved.version_title, saved.language));
        }
        info!(reference = %r, version = %key, "saved text");
        Ok(saved)
    }

    /// Derived links are a side effect of a save; failing to derive them
    /// does not fail the save.
    fn derive_links(&self, r: &Ref, text: &TextTree) {
        if r.is_commentary() {
            if let Err(e) = self.graph.derive_commentary_links(r, self) {
                warn!(reference = %r, error = %e, "commentary link derivation failed");
            }
        }
        if let Err(e) = self.graph.derive_text_links(r, text) {
            warn!(reference = %r, error = %e, "citation link derivation failed");
        }
    }

    /// Cached responses for refs linked to `r` carry `r`'s text.
    fn invalidate_linked(&self, r: &Ref) {
        match self.graph.query(r, None) {
            Ok(links) => {
                for link in links {
                    self.invalidate_citation(&link.reference);
                }
            }
            Err(e) => warn!(reference = %r, error = %e, "cannot find linked refs to invalidate"),
        }
    }

    pub fn set_version_status(
        &self,
        title: &str,
        language: Language,
        version_title: &str,
        status: VersionStatus,
    ) -> SdkResult<VersionedText> {
        let key = VersionKey::new(title, language, version_title);
        let mut doc = self
            .texts
            .get(&key)?
            .ok_or_else(|| SdkError::NotFound(format!("version {key}")))?;
        doc.status = status;
        let saved = self.texts.put(doc)?;
        self.invalidate_work(title);
        debug!(version = %key, status = ?saved.status, "set version status");
        Ok(saved)
    }

    // ---- Links ----

    pub fn save_link(&self, link: Link, actor: Option<&UserId>) -> SdkResult<Link> {
        let saved = self.graph.save(link, actor)?;
        for side in &saved.refs {
            self.invalidate_citation(side);
        }
        Ok(saved)
    }

    pub fn delete_link(&self, id: LinkId, actor: Option<&UserId>) -> SdkResult<Link> {
        let removed = self.graph.delete(id, actor)?;
        for side in &removed.refs {
            self.invalidate_citation(side);
        }
        Ok(removed)
    }

    /// Links touching `citation`, optionally with the text of each far side.
    pub fn links(&self, citation: &str, with_text: bool) -> SdkResult<Vec<AnnotatedLink>> {
        let r = self.parser.parse(citation, false)?;
        let texts = with_text.then_some(self as &dyn TextSource);
        Ok(self.graph.query(&r, texts)?)
    }

    // ---- Notes ----

    pub fn save_note(&self, note: Note, actor: &UserId, update: bool) -> SdkResult<Note> {
        Ok(self.notes.save(note, actor, update)?)
    }

    pub fn delete_note(&self, id: NoteId, actor: &UserId) -> SdkResult<Note> {
        Ok(self.notes.delete(id, actor)?)
    }

    pub fn notes(&self, citation: &str, filter: NoteFilter<'_>) -> SdkResult<Vec<AnnotatedNote>> {
        let r = self.parser.parse(citation, false)?;
        Ok(self.notes.query(&r, filter)?)
    }

    // ---- Index ----

    /// Store a work record. With `old_title` naming a different title, the
    /// work is renamed first, everywhere it is referenced.
    ///
    /// Alias targets are stored in canonical form. If one does not parse,
    /// the registry is put back as it was and the error returned.
    pub fn save_index(
        &self,
        index: WorkIndex,
        old_title: Option<&str>,
        actor: Option<&UserId>,
    ) -> SdkResult<WorkIndex> {
        let mut index = normalize_index(index);
        validate_fields(&index)?;
        self.registry.check_unique(&index, old_title)?;

        if let Some(old) = old_title.filter(|old| *old != index.title) {
            self.rename_title(old, &index.title, actor)?;
        }

        let previous = self.registry.save(index.clone(), old_title)?;
        let mut aliases = Vec::with_capacity(index.aliases.len());
        for alias in &index.aliases {
            match self.parser.norm_ref(&alias.to, false, 0) {
                Ok(to) => aliases.push(Alias::new(alias.from.clone(), to)),
                Err(e) => {
                    self.registry.restore(&index.title, previous)?;
                    return Err(e.into());
                }
            }
        }
        if aliases != index.aliases {
            index.aliases = aliases;
            self.registry.save(index.clone(), old_title)?;
        }

        self.record(
            ChangeRecord::new(ChangeKind::EditIndex, index.title.clone())
                .by(actor)
                .with_new(&index)
                .and_then(|c| match &previous {
                    Some(prev) => c.with_old(prev),
                    None => Ok(c),
                }),
        );
        if let Err(e) = self.cache.delete(TITLES_KEY) {
            warn!(error = %e, "title cache invalidation failed");
        }
        self.invalidate_work(&index.title);
        info!(title = %index.title, "saved index");
        Ok(index)
    }

    /// Merge `patch` into the stored record for `title`.
    pub fn update_index(
        &self,
        title: &str,
        patch: IndexPatch,
        actor: Option<&UserId>,
    ) -> SdkResult<WorkIndex> {
        let existing = self
            .registry
            .get(title)?
            .ok_or_else(|| SdkError::NotFound(format!("index {title}")))?;
        self.save_index(patch.apply(existing), None, actor)
    }

    pub(crate) fn record(&self, change: StoreResult<ChangeRecord>) {
        if let Err(e) = change.and_then(|c| self.history.record(c)) {
            warn!(error = %e, "failed to record history");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::request::TextRequest;
    use crate::test_support::{library, library_with, save_en, user};
    use lectern_store::{InMemoryHistory, StaticAuthorizer};

    #[test]
    fn structure_must_match_the_work() {
        let lib = library();
        let err = lib
            .save_text(
                "Genesis 1:1",
                TextSubmission::new(Language::English, "JPS", TextTree::segments(["x"])),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::StructureMismatch { expected: 2, implied: 3, .. }
        ));
        assert!(lib.texts().versions("Genesis", None).unwrap().is_empty());
    }

    #[test]
    fn saves_pad_missing_positions() {
        let lib = library();
        save_en(&lib, "Genesis 2:3", "JPS", TextTree::leaf("verse three"));
        let doc = lib
            .texts()
            .get(&VersionKey::new("Genesis", Language::English, "JPS"))
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.content,
            TextTree::node(vec![
                TextTree::node(vec![]),
                TextTree::segments(["", "", "verse three"]),
            ])
        );
    }

    #[test]
    fn posted_text_is_sanitized() {
        let lib = library();
        save_en(
            &lib,
            "Genesis 1",
            "JPS",
            TextTree::segments(["<b onclick=\"x()\">In</b> the <script>beginning</script>"]),
        );
        let r = lib.fetch(&TextRequest::new("Genesis 1:1").with_context(0)).unwrap();
        assert_eq!(r.text, TextTree::leaf("<b>In</b> the beginning"));
    }

    #[test]
    fn locked_versions_need_privilege() {
        let admin = user("admin");
        let lib = library_with(|b| {
            b.authorizer(Arc::new(StaticAuthorizer::new().with_privileged(user("admin"))))
        });
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["a"]));
        lib.set_version_status("Genesis", Language::English, "JPS", VersionStatus::Locked)
            .unwrap();

        let post = || TextSubmission::new(Language::English, "JPS", TextTree::segments(["b"]));
        let err = lib.save_text("Genesis 1", post(), Some(&user("guest"))).unwrap_err();
        assert!(matches!(err, SdkError::Locked(_)));
        assert!(lib.save_text("Genesis 1", post(), Some(&admin)).is_ok());

        assert!(matches!(
            lib.set_version_status("Genesis", Language::English, "Nope", VersionStatus::Locked),
            Err(SdkError::NotFound(_))
        ));
    }

    #[test]
    fn saves_are_recorded() {
        let history = Arc::new(InMemoryHistory::new());
        let lib = library_with(|b| b.history(history.clone()));
        lib.save_text(
            "Genesis 1:1",
            TextSubmission::new(Language::English, "JPS", TextTree::leaf("In the beginning")),
            Some(&user("editor")),
        )
        .unwrap();

        let edits: Vec<_> = history
            .records()
            .into_iter()
            .filter(|r| r.kind == ChangeKind::EditText)
            .collect();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].target, "Genesis 1:1");
        assert_eq!(edits[0].new, Some(serde_json::json!("In the beginning")));
        assert_eq!(edits[0].actor, Some(user("editor")));
    }

    #[test]
    fn citations_in_saved_text_become_links() {
        let lib = library();
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["plain", "compare Job 3:4"]));
        let links = lib.links("Genesis 1:2", false).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].reference, "Job 3:4");
        assert_eq!(links[0].anchor_ref, "Genesis 1:2");
    }

    #[test]
    fn link_derivation_can_be_disabled() {
        let mut config = crate::LibraryConfig::default();
        config.derive_links_on_save = false;
        let lib = library_with(|b| b.config(config));
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["compare Job 3:4"]));
        save_en(&lib, "Rashi on Genesis 1:1", "Rashi", TextTree::segments(["comment"]));
        assert!(lib.links("Genesis 1", false).unwrap().is_empty());
    }

    #[test]
    fn saving_commentary_links_it_to_the_base() {
        let lib = library();
        save_en(&lib, "Rashi on Genesis 1:1", "Rashi", TextTree::segments(["one", "two"]));
        let links = lib.links("Genesis 1:1", false).unwrap();
        let mut far: Vec<&str> = links.iter().map(|l| l.reference.as_str()).collect();
        far.sort();
        assert_eq!(far, vec!["Rashi on Genesis 1:1:1", "Rashi on Genesis 1:1:2"]);
        assert!(links.iter().all(|l| l.link_type == "commentary"));
    }

    #[test]
    fn link_changes_invalidate_both_sides() {
        let lib = library();
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["a"]));
        save_en(&lib, "Job 3", "JPS", TextTree::segments(["b", "c", "d", "e"]));

        let request = TextRequest::new("Genesis 1:1");
        assert!(lib.fetch(&request).unwrap().commentary.unwrap().is_empty());

        let link = lib
            .save_link(Link::new("Genesis 1:1", "Job 3:4", "allusion"), None)
            .unwrap();
        let links = lib.fetch(&request).unwrap().commentary.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, Some(TextTree::leaf("e")));

        lib.delete_link(link.id, None).unwrap();
        assert!(lib.fetch(&request).unwrap().commentary.unwrap().is_empty());
        assert!(lib.delete_link(link.id, None).is_err());
    }

    #[test]
    fn saving_text_refreshes_linked_responses() {
        let lib = library();
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["a"]));
        lib.save_link(Link::new("Genesis 1:1", "Job 3:1", "allusion"), None)
            .unwrap();

        let request = TextRequest::new("Genesis 1:1");
        let before = lib.fetch(&request).unwrap().commentary.unwrap();
        assert_eq!(before[0].text, Some(TextTree::leaf("")));

        save_en(&lib, "Job 3", "JPS", TextTree::segments(["now stored"]));
        let after = lib.fetch(&request).unwrap().commentary.unwrap();
        assert_eq!(after[0].text, Some(TextTree::leaf("now stored")));
    }

    #[test]
    fn notes_round_trip_through_the_library() {
        let lib = library();
        let owner = user("reader");
        let note = lib
            .save_note(Note::new("Gen 1:1", owner.clone(), "my thought"), &owner, false)
            .unwrap();
        assert_eq!(note.anchor, "Genesis 1:1");

        let mine = lib
            .notes("Genesis 1", NoteFilter { public: false, owner: Some(&owner) })
            .unwrap();
        assert_eq!(mine.len(), 1);
        let public = lib
            .notes("Genesis 1", NoteFilter { public: true, owner: None })
            .unwrap();
        assert!(public.is_empty());

        lib.delete_note(note.id, &owner).unwrap();
        assert!(lib
            .notes("Genesis 1", NoteFilter { public: false, owner: Some(&owner) })
            .unwrap()
            .is_empty());
    }

    #[test]
    fn index_save_normalizes_aliases_and_flushes_titles() {
        let lib = library();
        assert!(!lib.text_titles().unwrap().contains(&"Exodus".to_string()));

        let exodus = WorkIndex::new("exodus", &["Chapter", "Verse"], &["Tanach", "Torah"])
            .with_length(40)
            .with_alias("Song of the Sea", "Exodus 15.1");
        let saved = lib.save_index(exodus, None, None).unwrap();
        assert_eq!(saved.title, "Exodus");
        assert_eq!(saved.aliases[0].to, "Exodus 15:1");
        assert_eq!(lib.registry().get("Exodus").unwrap().unwrap().aliases[0].to, "Exodus 15:1");

        let titles = lib.text_titles().unwrap();
        assert!(titles.contains(&"Exodus".to_string()));
        assert!(titles.contains(&"Song of the Sea".to_string()));
    }

    #[test]
    fn bad_alias_restores_the_registry() {
        let lib = library();
        let before = lib.registry().get("Job").unwrap().unwrap();
        let broken = before.clone().with_alias("Nowhere", "Nonexistent Book 4");
        assert!(lib.save_index(broken, None, None).is_err());
        assert_eq!(lib.registry().get("Job").unwrap().unwrap(), before);

        let fresh = WorkIndex::new("Obadiah", &["Chapter", "Verse"], &["Tanach"])
            .with_alias("Ob", "Unknown 1");
        assert!(lib.save_index(fresh, None, None).is_err());
        assert!(lib.registry().get("Obadiah").unwrap().is_none());
    }

    #[test]
    fn index_validation_and_uniqueness() {
        let lib = library();
        let bad = WorkIndex::new("Bad-Title", &["Chapter"], &["Tanach"]);
        assert!(lib.save_index(bad, None, None).is_err());

        let clash = WorkIndex::new("Genesis Two", &["Chapter"], &["Tanach"]).with_variants(&["Gen"]);
        let err = lib.save_index(clash, None, None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Invalid);
    }

    #[test]
    fn update_index_patches_the_record() {
        let lib = library();
        let patch: IndexPatch = serde_json::from_str(r#"{"length": 60}"#).unwrap();
        let updated = lib.update_index("Job", patch, None).unwrap();
        assert_eq!(updated.length, Some(60));
        assert_eq!(updated.section_names, vec!["Chapter", "Verse"]);
        assert!(lib.parse("Job 55", false).is_ok());

        let err = lib.update_index("Nope", IndexPatch::default(), None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }
}
