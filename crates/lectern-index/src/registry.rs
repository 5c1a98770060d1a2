//! The [`IndexRegistry`] holding every work's metadata.
//!
//! Records are kept in a `BTreeMap` keyed by canonical title. Resolution
//! results are memoized by the normalized input string; every mutation bumps
//! a generation counter and drops the memo, so dependent caches (the ref
//! parser's memo, title lists) can detect staleness by comparing
//! generations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use lectern_types::{Alias, WorkIndex};

use crate::error::{IndexError, IndexResult};
use crate::validate::{normalize_index, validate_fields};

/// Canonical form of a user-supplied title: underscores become spaces and
/// the first letter is upper-cased.
pub fn normalize_title(title: &str) -> String {
    let title = title.replace('_', " ");
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> IndexError {
    IndexError::Poisoned(e.to_string())
}

/// Thread-safe store of [`WorkIndex`] records with title resolution.
#[derive(Debug)]
pub struct IndexRegistry {
    works: RwLock<BTreeMap<String, WorkIndex>>,
    resolved: RwLock<HashMap<String, WorkIndex>>,
    generation: AtomicU64,
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self {
            works: RwLock::new(BTreeMap::new()),
            resolved: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Monotonic counter bumped by every mutation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        match self.resolved.write() {
            Ok(mut memo) => memo.clear(),
            Err(poison) => poison.into_inner().clear(),
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Reject `index` if any of its title variants belongs to another work.
    ///
    /// A conflict with `old_title` is allowed: that record is the one being
    /// renamed.
    pub fn check_unique(&self, index: &WorkIndex, old_title: Option<&str>) -> IndexResult<()> {
        let works = self.works.read().map_err(poisoned)?;
        for variant in &index.title_variants {
            let owner = works.values().find(|w| w.has_variant(variant));
            if let Some(owner) = owner {
                if owner.title != index.title && old_title != Some(owner.title.as_str()) {
                    return Err(IndexError::DuplicateTitle(variant.clone()));
                }
            }
        }
        Ok(())
    }

    /// Reject `new` as a title for `renaming` if it already names another
    /// work: a stored variant, a commentary form, or an alias.
    pub fn check_title_free(&self, new: &str, renaming: &str) -> IndexResult<()> {
        if self.alias_for(new)?.is_some() {
            return Err(IndexError::DuplicateTitle(new.to_string()));
        }
        match self.resolve(new) {
            Ok(owner) if owner.title != renaming => Err(IndexError::DuplicateTitle(new.to_string())),
            Ok(_) | Err(IndexError::UnknownWork(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Normalize, validate, and store a record. An existing record with the
    /// same title is replaced, keeping its Hebrew title and length when the
    /// new record leaves them unset.
    ///
    /// Returns the previous record so the caller can [`restore`] it if a
    /// later step of the save fails.
    ///
    /// [`restore`]: IndexRegistry::restore
    pub fn save(&self, index: WorkIndex, old_title: Option<&str>) -> IndexResult<Option<WorkIndex>> {
        let mut index = normalize_index(index);
        validate_fields(&index)?;
        self.check_unique(&index, old_title)?;

        let mut works = self.works.write().map_err(poisoned)?;
        let previous = works.get(&index.title).cloned();
        if let Some(existing) = &previous {
            if index.he_title.is_none() {
                index.he_title = existing.he_title.clone();
            }
            if index.length.is_none() {
                index.length = existing.length;
            }
        }
        debug!(title = %index.title, depth = index.depth(), "saved work index");
        works.insert(index.title.clone(), index);
        drop(works);

        self.invalidate();
        Ok(previous)
    }

    /// Undo a [`save`](IndexRegistry::save): put back `previous`, or remove
    /// `title` if there was no previous record.
    pub fn restore(&self, title: &str, previous: Option<WorkIndex>) -> IndexResult<()> {
        let mut works = self.works.write().map_err(poisoned)?;
        match previous {
            Some(prev) => {
                works.insert(prev.title.clone(), prev);
            }
            None => {
                works.remove(title);
            }
        }
        drop(works);
        self.invalidate();
        Ok(())
    }

    /// Change a record's primary title. The old title is dropped from its
    /// variants and the new one added. Returns `false` if `old` is not a
    /// stored record (derived commentary titles are never stored), and
    /// [`IndexError::DuplicateTitle`] if another record already uses `new`.
    pub fn rename_title(&self, old: &str, new: &str) -> IndexResult<bool> {
        let mut works = self.works.write().map_err(poisoned)?;
        if works.values().any(|w| w.title != old && w.has_variant(new)) {
            return Err(IndexError::DuplicateTitle(new.to_string()));
        }
        let Some(mut record) = works.remove(old) else {
            return Ok(false);
        };
        record.title = new.to_string();
        record.title_variants.retain(|v| v != old);
        if !record.title_variants.iter().any(|v| v == new) {
            record.title_variants.push(new.to_string());
        }
        works.insert(new.to_string(), record);
        drop(works);

        debug!(old, new, "renamed work index");
        self.invalidate();
        Ok(true)
    }

    /// Replace every occurrence of category `old` with `new`. Returns the
    /// number of records touched.
    pub fn rename_category(&self, old: &str, new: &str) -> IndexResult<usize> {
        let mut works = self.works.write().map_err(poisoned)?;
        let mut touched = 0;
        for record in works.values_mut() {
            if record.categories.iter().any(|c| c == old) {
                for cat in record.categories.iter_mut().filter(|c| *c == old) {
                    *cat = new.to_string();
                }
                touched += 1;
            }
        }
        drop(works);
        self.invalidate();
        Ok(touched)
    }

    /// Replace a record's section names (structural resize).
    pub fn set_section_names(&self, title: &str, names: Vec<String>) -> IndexResult<()> {
        let mut works = self.works.write().map_err(poisoned)?;
        let record = works
            .get_mut(title)
            .ok_or_else(|| IndexError::NotFound(title.to_string()))?;
        record.section_names = names;
        drop(works);
        self.invalidate();
        Ok(())
    }

    pub fn remove(&self, title: &str) -> IndexResult<Option<WorkIndex>> {
        let removed = self.works.write().map_err(poisoned)?.remove(title);
        if removed.is_some() {
            self.invalidate();
        }
        Ok(removed)
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// The stored record whose canonical title is exactly `title`.
    pub fn get(&self, title: &str) -> IndexResult<Option<WorkIndex>> {
        Ok(self.works.read().map_err(poisoned)?.get(title).cloned())
    }

    pub fn len(&self) -> usize {
        self.works.read().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a title, variant, or `"<Commentator> on <Base>"` form.
    pub fn resolve(&self, name: &str) -> IndexResult<WorkIndex> {
        let name = normalize_title(name.trim());
        if let Some(hit) = self.resolved.read().map_err(poisoned)?.get(&name) {
            return Ok(hit.clone());
        }

        let generation = self.generation();
        let found = {
            let works = self.works.read().map_err(poisoned)?;
            works
                .values()
                .find(|w| w.has_variant(&name))
                .cloned()
                .or_else(|| resolve_commentary(&works, &name))
        };

        let Some(index) = found else {
            return Err(IndexError::UnknownWork(name));
        };
        debug!(name = %name, title = %index.title, "resolved work index");

        let mut memo = self.resolved.write().map_err(poisoned)?;
        if self.generation() == generation {
            memo.insert(name, index.clone());
        }
        Ok(index)
    }

    /// Every stored record, in title order.
    pub fn all(&self) -> IndexResult<Vec<WorkIndex>> {
        Ok(self.works.read().map_err(poisoned)?.values().cloned().collect())
    }

    /// Every citable name: title variants plus alias `from` names.
    pub fn titles(&self) -> IndexResult<Vec<String>> {
        let works = self.works.read().map_err(poisoned)?;
        let names: BTreeSet<String> = works
            .values()
            .flat_map(|w| {
                w.title_variants
                    .iter()
                    .cloned()
                    .chain(w.aliases.iter().map(|a| a.from.clone()))
            })
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Distinct categories across all records.
    pub fn categories(&self) -> IndexResult<Vec<String>> {
        let works = self.works.read().map_err(poisoned)?;
        let cats: BTreeSet<String> = works
            .values()
            .flat_map(|w| w.categories.iter().cloned())
            .collect();
        Ok(cats.into_iter().collect())
    }

    /// Canonical titles of bare commentator records.
    pub fn commentators(&self) -> IndexResult<Vec<String>> {
        let works = self.works.read().map_err(poisoned)?;
        Ok(works
            .values()
            .filter(|w| w.is_commentator())
            .map(|w| w.title.clone())
            .collect())
    }

    /// Known Latin-script titles occurring verbatim in `text`.
    pub fn titles_in_text(&self, text: &str) -> IndexResult<Vec<String>> {
        Ok(self
            .titles()?
            .into_iter()
            .filter(|t| text.contains(t.as_str()))
            .collect())
    }

    /// Known Hebrew titles occurring verbatim in `text`.
    pub fn hebrew_titles_in_text(&self, text: &str) -> IndexResult<Vec<String>> {
        let works = self.works.read().map_err(poisoned)?;
        let names: BTreeSet<String> = works
            .values()
            .flat_map(|w| w.he_title_variants.iter())
            .filter(|t| !t.is_empty() && text.contains(t.as_str()))
            .cloned()
            .collect();
        Ok(names.into_iter().collect())
    }

    /// The work whose Hebrew title variant is the longest prefix of `text`,
    /// with the matched variant.
    pub fn hebrew_prefix_match(&self, text: &str) -> IndexResult<Option<(WorkIndex, String)>> {
        let works = self.works.read().map_err(poisoned)?;
        let best = works
            .values()
            .flat_map(|w| w.he_title_variants.iter().map(move |v| (w, v)))
            .filter(|(_, v)| !v.is_empty() && text.starts_with(v.as_str()))
            .max_by_key(|(_, v)| v.chars().count());
        Ok(best.map(|(w, v)| (w.clone(), v.clone())))
    }

    /// The registered alias whose `from` equals `name`.
    pub fn alias_for(&self, name: &str) -> IndexResult<Option<Alias>> {
        let works = self.works.read().map_err(poisoned)?;
        Ok(works
            .values()
            .flat_map(|w| w.aliases.iter())
            .find(|a| a.from == name)
            .cloned())
    }
}

fn resolve_commentary(works: &BTreeMap<String, WorkIndex>, name: &str) -> Option<WorkIndex> {
    for commentator in works.values().filter(|w| w.is_commentator()) {
        for variant in &commentator.title_variants {
            let Some(rest) = name
                .strip_prefix(variant.as_str())
                .and_then(|r| r.strip_prefix(" on "))
            else {
                continue;
            };
            if let Some(base) = works
                .values()
                .find(|w| w.is_base_text() && w.has_variant(rest))
            {
                return Some(commentator.commentary_on(base));
            }
        }
    }
    None
}
