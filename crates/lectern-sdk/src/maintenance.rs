//! Library-wide maintenance: renames, version merges, resizes, removal.
//!
//! These touch many documents with no transaction around them. A failure
//! partway is returned to the caller; documents already changed stay
//! changed. Each operation flushes the text cache when it finishes.

use tracing::{info, warn};

use lectern_index::IndexError;
use lectern_merge::{merge_by_coverage, resize, resize_delta};
use lectern_store::{ChangeKind, ChangeRecord};
use lectern_types::{Language, UserId, VersionKey, VersionedText, WorkIndex};

use crate::error::{SdkError, SdkResult};
use crate::library::{Library, TITLES_KEY};

impl Library {
    /// Rename a work everywhere: its index record, stored versions, link
    /// sides, notes, and history.
    ///
    /// Renaming a commentator also renames every `"<old> on X"` work, and
    /// renaming a base work renames every `"<C> on <old>"` work.
    pub fn rename_title(&self, old: &str, new: &str, actor: Option<&UserId>) -> SdkResult<()> {
        let index = self.registry.resolve(old)?;
        let old = index.title.as_str();
        self.registry.check_title_free(new, old)?;
        if old != new && !self.texts.versions(new, None)?.is_empty() {
            return Err(IndexError::DuplicateTitle(new.to_string()).into());
        }

        if index.is_commentator() {
            for base in self.registry.all()?.iter().filter(|w| is_base(w)) {
                self.rename_everywhere(
                    &format!("{old} on {}", base.title),
                    &format!("{new} on {}", base.title),
                )?;
            }
        } else if index.commentary.is_none() {
            for commentator in self.registry.commentators()? {
                self.rename_everywhere(
                    &format!("{commentator} on {old}"),
                    &format!("{commentator} on {new}"),
                )?;
            }
        }
        self.rename_everywhere(old, new)?;

        self.record(
            ChangeRecord::new(ChangeKind::RenameTitle, new)
                .by(actor)
                .with_old(&old)
                .and_then(|c| c.with_new(&new)),
        );
        if let Err(e) = self.cache.delete(TITLES_KEY) {
            warn!(error = %e, "title cache invalidation failed");
        }
        self.flush_cache();
        Ok(())
    }

    fn rename_everywhere(&self, old: &str, new: &str) -> SdkResult<()> {
        let indexed = self.registry.rename_title(old, new)?;
        let texts = self.texts.rename_title(old, new)?;
        let links = self.graph.rename_title(old, new)?;
        let notes = self.notes.rename_title(old, new)?;
        let history = self.history.rename_title(old, new).unwrap_or_else(|e| {
            warn!(old, new, error = %e, "failed to rename history targets");
            0
        });
        if indexed || texts + links + notes + history > 0 {
            info!(old, new, indexed, texts, links, notes, history, "renamed title");
        }
        Ok(())
    }

    /// Rename one version of a work.
    pub fn rename_version(
        &self,
        title: &str,
        language: Language,
        old: &str,
        new: &str,
        actor: Option<&UserId>,
    ) -> SdkResult<VersionedText> {
        let from = VersionKey::new(title, language, old);
        let to = VersionKey::new(title, language, new);
        let mut doc = self.require_version(&from)?;
        if self.texts.get(&to)?.is_some() {
            return Err(SdkError::Invalid(format!("version {to} already exists")));
        }

        self.texts.delete(&from)?;
        doc.version_title = new.to_string();
        let saved = self.texts.put(doc)?;

        self.record(
            ChangeRecord::new(ChangeKind::RenameVersion, title)
                .by(actor)
                .with_old(&old)
                .and_then(|c| c.with_new(&new)),
        );
        self.invalidate_work(title);
        info!(%from, %to, "renamed version");
        Ok(saved)
    }

    /// Fold version `v2` into `v1`: positions `v1` leaves empty take `v2`'s
    /// text, then `v2` is deleted.
    pub fn merge_text_versions(
        &self,
        title: &str,
        language: Language,
        v1: &str,
        v2: &str,
        actor: Option<&UserId>,
    ) -> SdkResult<VersionedText> {
        let keep_key = VersionKey::new(title, language, v1);
        let fold_key = VersionKey::new(title, language, v2);
        let mut keep = self.require_version(&keep_key)?;
        let fold = self.require_version(&fold_key)?;

        let merged = merge_by_coverage(&[keep.content.clone(), fold.content]);
        keep.content = merged.text;
        let saved = self.texts.put(keep)?;
        self.texts.delete(&fold_key)?;

        self.record(
            ChangeRecord::new(ChangeKind::RenameVersion, title)
                .by(actor)
                .with_old(&v2)
                .and_then(|c| c.with_new(&v1)),
        );
        self.invalidate_work(title);
        info!(into = %keep_key, from = %fold_key, "merged versions");
        Ok(saved)
    }

    /// Rename a category across every index record. Returns how many
    /// records changed.
    pub fn rename_category(&self, old: &str, new: &str) -> SdkResult<usize> {
        let touched = self.registry.rename_category(old, new)?;
        self.flush_cache();
        info!(old, new, touched, "renamed category");
        Ok(touched)
    }

    /// Give a work new section names, reshaping every stored version to the
    /// new depth. With `in_place`, added levels wrap the existing text as
    /// the first section of the new outer level.
    pub fn resize_text(
        &self,
        title: &str,
        section_names: Vec<String>,
        in_place: bool,
        actor: Option<&UserId>,
    ) -> SdkResult<usize> {
        let index = self.require_index(title)?;
        let delta = resize_delta(index.depth(), section_names.len())?;

        let versions = self.texts.versions(title, None)?;
        for mut doc in versions.iter().cloned() {
            doc.content = resize(&doc.content, delta, in_place)?;
            self.texts.put(doc)?;
        }
        self.registry.set_section_names(title, section_names.clone())?;

        self.record(
            ChangeRecord::new(ChangeKind::EditIndex, title)
                .by(actor)
                .with_old(&index.section_names)
                .and_then(|c| c.with_new(&section_names)),
        );
        self.flush_cache();
        info!(title, delta, versions = versions.len(), "resized text");
        Ok(versions.len())
    }

    /// Delete a work with its versions, links, and notes.
    pub fn remove_work(&self, title: &str, actor: Option<&UserId>) -> SdkResult<WorkIndex> {
        let index = self.require_index(title)?;

        let versions = self.texts.versions(title, None)?;
        for doc in &versions {
            self.texts.delete(&doc.key())?;
        }
        let links = self.graph.remove_work(title)?;
        let notes = self.notes.remove_work(title)?;
        self.registry.remove(title)?;

        self.record(
            ChangeRecord::new(ChangeKind::DeleteWork, title)
                .by(actor)
                .with_old(&index),
        );
        if let Err(e) = self.cache.delete(TITLES_KEY) {
            warn!(error = %e, "title cache invalidation failed");
        }
        self.flush_cache();
        info!(title, versions = versions.len(), links, notes, "removed work");
        Ok(index)
    }

    fn require_version(&self, key: &VersionKey) -> SdkResult<VersionedText> {
        self.texts
            .get(key)?
            .ok_or_else(|| SdkError::NotFound(format!("version {key}")))
    }

    fn require_index(&self, title: &str) -> SdkResult<WorkIndex> {
        self.registry
            .get(title)?
            .ok_or_else(|| SdkError::NotFound(format!("index {title}")))
    }
}

/// A stored work a commentator can be paired with.
fn is_base(work: &WorkIndex) -> bool {
    !work.is_commentator() && work.commentary.is_none()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::request::TextRequest;
    use crate::test_support::{library, library_with, save_en, user};
    use lectern_links::NoteFilter;
    use lectern_store::InMemoryHistory;
    use lectern_types::{Link, Note, TextTree};

    fn versions(lib: &Library, title: &str) -> Vec<String> {
        lib.texts()
            .versions(title, None)
            .unwrap()
            .into_iter()
            .map(|v| v.version_title)
            .collect()
    }

    #[test]
    fn rename_cascades_through_every_collection() {
        let history = Arc::new(InMemoryHistory::new());
        let lib = library_with(|b| b.history(history.clone()));
        let reader = user("reader");
        save_en(&lib, "Job 3", "JPS", TextTree::segments(["a", "b"]));
        lib.save_link(Link::new("Job 3:1", "Psalms 8:3", "allusion"), None)
            .unwrap();
        lib.save_note(Note::new("Job 3:2", reader.clone(), "hmm"), &reader, false)
            .unwrap();

        let cached = TextRequest::new("Job 3").with_context(0);
        lib.fetch(&cached).unwrap();

        lib.rename_title("Job", "Iyov", None).unwrap();

        assert!(lib.registry().get("Job").unwrap().is_none());
        assert!(lib.registry().get("Iyov").unwrap().is_some());
        assert_eq!(versions(&lib, "Iyov"), vec!["JPS"]);
        assert!(versions(&lib, "Job").is_empty());

        let links = lib.links("Psalms 8:3", false).unwrap();
        assert_eq!(links[0].reference, "Iyov 3:1");
        let notes = lib
            .notes("Iyov 3", NoteFilter { public: false, owner: Some(&reader) })
            .unwrap();
        assert_eq!(notes.len(), 1);

        assert!(lib.fetch(&cached).is_err());
        let r = lib.fetch(&TextRequest::new("Iyov 3").with_context(0)).unwrap();
        assert_eq!(r.text, TextTree::segments(["a", "b"]));

        assert!(history
            .records()
            .iter()
            .all(|r| !r.target.starts_with("Job ")));
        assert!(history.records().iter().any(|r| r.kind == ChangeKind::RenameTitle));
    }

    #[test]
    fn renaming_a_base_work_renames_its_commentaries() {
        let lib = library();
        save_en(&lib, "Rashi on Genesis 1:1", "Rashi", TextTree::segments(["c"]));
        lib.rename_title("Genesis", "Bereshit", None).unwrap();

        assert_eq!(versions(&lib, "Rashi on Bereshit"), vec!["Rashi"]);
        let links = lib.links("Bereshit 1:1", false).unwrap();
        assert_eq!(links[0].reference, "Rashi on Bereshit 1:1:1");
    }

    #[test]
    fn renaming_a_commentator_renames_its_works() {
        let lib = library();
        save_en(&lib, "Rashi on Genesis 1:1", "Rashi", TextTree::segments(["c"]));
        save_en(&lib, "Rashi on Job 1:1", "Rashi", TextTree::segments(["d"]));
        lib.rename_title("Rashi", "Rabbi Shlomo", None).unwrap();

        assert_eq!(versions(&lib, "Rabbi Shlomo on Genesis"), vec!["Rashi"]);
        assert_eq!(versions(&lib, "Rabbi Shlomo on Job"), vec!["Rashi"]);
        assert!(versions(&lib, "Rashi on Genesis").is_empty());
        let r = lib
            .fetch(&TextRequest::new("Rabbi Shlomo on Genesis 1:1:1").with_context(0))
            .unwrap();
        assert_eq!(r.text, TextTree::leaf("c"));
    }

    #[test]
    fn rename_onto_an_existing_work_changes_nothing() {
        let lib = library();
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["g"]));
        save_en(&lib, "Job 3", "JPS", TextTree::segments(["j"]));

        let err = lib.rename_title("Job", "Genesis", None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Invalid);
        let err = lib.rename_title("Job", "Gen", None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Invalid);

        assert_eq!(lib.registry().get("Genesis").unwrap().unwrap().title, "Genesis");
        assert!(lib.registry().get("Job").unwrap().is_some());
        let r = lib.fetch(&TextRequest::new("Genesis 1").with_context(0)).unwrap();
        assert_eq!(r.text, TextTree::segments(["g"]));
        let r = lib.fetch(&TextRequest::new("Job 3").with_context(0)).unwrap();
        assert_eq!(r.text, TextTree::segments(["j"]));
    }

    #[test]
    fn rename_of_unknown_work_fails() {
        let lib = library();
        let err = lib.rename_title("Nonexistent", "Other", None).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnknownWork);
    }

    #[test]
    fn version_rename() {
        let lib = library();
        save_en(&lib, "Genesis 1", "JPS", TextTree::segments(["a"]));
        save_en(&lib, "Genesis 1", "Other", TextTree::segments(["b"]));

        let renamed = lib
            .rename_version("Genesis", Language::English, "JPS", "JPS 1917", None)
            .unwrap();
        assert_eq!(renamed.version_title, "JPS 1917");
        assert!(versions(&lib, "Genesis").contains(&"JPS 1917".to_string()));

        let clash = lib.rename_version("Genesis", Language::English, "Other", "JPS 1917", None);
        assert!(matches!(clash, Err(SdkError::Invalid(_))));
        let missing = lib.rename_version("Genesis", Language::English, "Nope", "X", None);
        assert!(matches!(missing, Err(SdkError::NotFound(_))));
    }

    #[test]
    fn version_merge_fills_gaps_and_drops_the_donor() {
        let lib = library();
        save_en(&lib, "Genesis 1", "Main", TextTree::segments(["m1", ""]));
        save_en(&lib, "Genesis 1", "Donor", TextTree::segments(["d1", "d2", "d3"]));
        save_en(&lib, "Genesis 2", "Donor", TextTree::segments(["d2:1"]));

        let merged = lib
            .merge_text_versions("Genesis", Language::English, "Main", "Donor", None)
            .unwrap();
        assert_eq!(
            merged.content,
            TextTree::node(vec![
                TextTree::segments(["m1", "d2", "d3"]),
                TextTree::segments(["d2:1"]),
            ])
        );
        assert_eq!(versions(&lib, "Genesis"), vec!["Main"]);
    }

    #[test]
    fn category_rename() {
        let lib = library();
        let touched = lib.rename_category("Writings", "Ketuvim").unwrap();
        assert_eq!(touched, 2);
        let cats = lib.categories().unwrap();
        assert!(cats.contains(&"Ketuvim".to_string()));
        assert!(!cats.contains(&"Writings".to_string()));
        let r = lib.fetch(&TextRequest::new("Job 1").with_context(0)).unwrap();
        assert_eq!(r.categories, vec!["Tanach", "Ketuvim"]);
    }

    #[test]
    fn resize_reshapes_stored_text() {
        let lib = library();
        save_en(&lib, "Psalms 1", "JPS", TextTree::segments(["a", "b"]));

        let names = vec!["Chapter".to_string(), "Verse".to_string(), "Word".to_string()];
        assert_eq!(lib.resize_text("Psalms", names, false, None).unwrap(), 1);
        let r = lib
            .fetch(&TextRequest::new("Psalms 1:2:1").with_context(0))
            .unwrap();
        assert_eq!(r.text, TextTree::leaf("b"));

        let names = vec!["Chapter".to_string()];
        lib.resize_text("Psalms", names, false, None).unwrap();
        let doc = lib
            .texts()
            .get(&VersionKey::new("Psalms", Language::English, "JPS"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.content, TextTree::segments(["a b"]));

        assert!(lib.resize_text("Psalms", vec![], false, None).is_err());
        assert!(lib.resize_text("Nope", vec!["A".into()], false, None).is_err());
    }

    #[test]
    fn removing_a_work_removes_its_data() {
        let lib = library();
        save_en(&lib, "Job 3", "JPS", TextTree::segments(["a"]));
        lib.save_link(Link::new("Job 3:1", "Genesis 1:1", ""), None)
            .unwrap();

        let removed = lib.remove_work("Job", None).unwrap();
        assert_eq!(removed.title, "Job");
        assert!(versions(&lib, "Job").is_empty());
        assert!(lib.links("Genesis 1:1", false).unwrap().is_empty());
        assert!(lib.parse("Job 3", false).is_err());
        assert!(!lib.text_titles().unwrap().contains(&"Job".to_string()));
        assert!(lib.remove_work("Job", None).is_err());
    }
}
