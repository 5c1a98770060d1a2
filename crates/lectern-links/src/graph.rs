//! The link graph: saving, deleting, and querying links between refs.
//!
//! Both sides of a stored link are canonical ref strings. Saving suppresses
//! duplicates in three ways:
//!
//! - the exact pair already exists untyped and a manual save supplies a
//!   type: the existing link is upgraded in place
//! - the exact pair already exists otherwise: rejected
//! - a link between narrower refs already exists, sharing one side exactly
//!   and with its other side inside the new link's other side: rejected
//!
//! Derived links go through the same checks; callers deriving links treat
//! the two rejections as "already known" and move on.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use lectern_refs::{covers, top_section, Ref, RefParser};
use lectern_store::{ref_has_prefix, ChangeKind, ChangeRecord, HistoryRecorder, LinkStore, StoreResult};
use lectern_types::{Link, LinkId, TextTree, UserId};

use crate::error::{LinkError, LinkResult};
use crate::format::AnnotatedLink;

/// English and Hebrew text of one ref.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionText {
    pub text: TextTree,
    pub he: TextTree,
}

impl SectionText {
    /// Children at the outer level of whichever language has more.
    pub fn child_count(&self) -> usize {
        self.text.child_count().max(self.he.child_count())
    }

    fn section(&self, sections: &[u32], to_sections: &[u32]) -> SectionText {
        SectionText {
            text: self.text.section(sections, to_sections),
            he: self.he.section(sections, to_sections),
        }
    }
}

/// Supplies stored text to the link graph without it knowing about
/// versions or merging.
pub trait TextSource {
    /// Merged text at `r`, or `None` if nothing is stored there.
    fn text_at(&self, r: &Ref) -> Option<SectionText>;
}

/// Link collection plus the rules for adding to it.
pub struct LinkGraph {
    parser: Arc<RefParser>,
    links: Arc<dyn LinkStore>,
    history: Arc<dyn HistoryRecorder>,
}

impl LinkGraph {
    pub fn new(
        parser: Arc<RefParser>,
        links: Arc<dyn LinkStore>,
        history: Arc<dyn HistoryRecorder>,
    ) -> Self {
        Self {
            parser,
            links,
            history,
        }
    }

    pub fn parser(&self) -> &Arc<RefParser> {
        &self.parser
    }

    pub fn get(&self, id: LinkId) -> LinkResult<Option<Link>> {
        Ok(self.links.get(id)?)
    }

    /// Save a new link, or update the stored link with the same id.
    ///
    /// Returns the link as stored, which for a type upgrade is the
    /// pre-existing record rather than `link`.
    pub fn save(&self, mut link: Link, actor: Option<&UserId>) -> LinkResult<Link> {
        for side in link.refs.iter_mut() {
            *side = self.parser.norm_ref(side, true, 0)?;
        }

        if let Some(existing) = self.links.get(link.id)? {
            self.links.put(link.clone())?;
            self.record(
                ChangeRecord::new(ChangeKind::EditLink, link.id.to_string())
                    .by(actor)
                    .with_old(&existing)
                    .and_then(|c| c.with_new(&link)),
            );
            debug!(id = %link.id, "updated link");
            return Ok(link);
        }

        let nearby = self.nearby(&link)?;

        if let Some(same) = nearby.iter().find(|l| l.same_pair(&link)) {
            if !link.auto && link.is_typed() && !same.is_typed() {
                let mut upgraded = same.clone();
                upgraded.link_type = link.link_type.clone();
                self.links.put(upgraded.clone())?;
                self.record(
                    ChangeRecord::new(ChangeKind::EditLink, upgraded.id.to_string())
                        .by(actor)
                        .with_old(same)
                        .and_then(|c| c.with_new(&upgraded)),
                );
                info!(id = %upgraded.id, link_type = %upgraded.link_type, "upgraded untyped link");
                return Ok(upgraded);
            }
            let [a, b] = link.refs;
            return Err(LinkError::Duplicate(a, b));
        }

        if let Some(precise) = self.more_precise(&link, &nearby) {
            let [a, b] = precise.refs.clone();
            return Err(LinkError::MorePrecise(a, b));
        }

        self.links.put(link.clone())?;
        self.record(
            ChangeRecord::new(ChangeKind::AddLink, link.id.to_string())
                .by(actor)
                .with_new(&link),
        );
        debug!(id = %link.id, a = %link.refs[0], b = %link.refs[1], auto = link.auto, "added link");
        Ok(link)
    }

    /// Save a derived link. Duplicate rejections count as success without
    /// creating anything; the return value says whether a link was added.
    pub fn save_derived(&self, link: Link) -> LinkResult<bool> {
        match self.save(link, None) {
            Ok(_) => Ok(true),
            Err(e) if e.is_duplicate() => {
                debug!(error = %e, "derived link already known");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn delete(&self, id: LinkId, actor: Option<&UserId>) -> LinkResult<Link> {
        let existing = self
            .links
            .get(id)?
            .ok_or_else(|| LinkError::NotFound(format!("link {id}")))?;
        self.links.delete(id)?;
        self.record(
            ChangeRecord::new(ChangeKind::DeleteLink, id.to_string())
                .by(actor)
                .with_old(&existing),
        );
        debug!(%id, "deleted link");
        Ok(existing)
    }

    /// Every link with a side inside `r`, oriented from that side. With a
    /// text source, each result carries the text of its far side; each
    /// distinct top-level section is fetched once.
    pub fn query(&self, r: &Ref, texts: Option<&dyn TextSource>) -> LinkResult<Vec<AnnotatedLink>> {
        let prefix = query_prefix(r);
        let query = r.canonical();
        let mut fetched: HashMap<String, SectionText> = HashMap::new();
        let mut out = Vec::new();

        for link in self.links.touching(&prefix)? {
            let Some((side, anchor)) = self.anchor_side(r, &prefix, &link) else {
                continue;
            };
            let far = &link.refs[1 - side];
            let linked = match self.parser.parse(far, false) {
                Ok(linked) => linked,
                Err(e) => {
                    warn!(id = %link.id, reference = %far, error = %e, "skipping link with unparsable ref");
                    continue;
                }
            };

            let mut annotated = AnnotatedLink::new(&link, &anchor, &linked, &query);
            if let Some(source) = texts {
                let text = linked_text(&linked, source, &mut fetched);
                annotated.text = Some(text.text);
                annotated.he = Some(text.he);
            }
            out.push(annotated);
        }

        debug!(reference = %query, count = out.len(), "queried links");
        Ok(out)
    }

    /// Rewrite link sides citing work `old` to cite `new`. Returns how many
    /// links changed.
    pub fn rename_title(&self, old: &str, new: &str) -> LinkResult<usize> {
        let mut changed = 0;
        for mut link in self.links.touching(old)? {
            let mut touched = false;
            for side in link.refs.iter_mut() {
                if ref_has_prefix(side, old) {
                    *side = format!("{new}{}", &side[old.len()..]);
                    touched = true;
                }
            }
            if touched {
                self.links.put(link)?;
                changed += 1;
            }
        }
        info!(old, new, changed, "renamed title in links");
        Ok(changed)
    }

    /// Delete every link with a side in work `title`.
    pub fn remove_work(&self, title: &str) -> LinkResult<usize> {
        let doomed = self.links.touching(title)?;
        for link in &doomed {
            self.links.delete(link.id)?;
        }
        info!(title, removed = doomed.len(), "removed links of work");
        Ok(doomed.len())
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn record(&self, change: StoreResult<ChangeRecord>) {
        if let Err(e) = change.and_then(|c| self.history.record(c)) {
            warn!(error = %e, "failed to record link history");
        }
    }

    /// Stored links touching either side of `link`, without repeats.
    fn nearby(&self, link: &Link) -> LinkResult<Vec<Link>> {
        let mut found = self.links.touching(&link.refs[0])?;
        for candidate in self.links.touching(&link.refs[1])? {
            if !found.iter().any(|l| l.id == candidate.id) {
                found.push(candidate);
            }
        }
        Ok(found)
    }

    fn more_precise<'a>(&self, link: &Link, nearby: &'a [Link]) -> Option<&'a Link> {
        let parsed = |s: &str| self.parser.parse(s, false).ok();
        let new_sides = [parsed(&link.refs[0])?, parsed(&link.refs[1])?];

        nearby.iter().find(|existing| {
            (0..2).any(|shared| {
                let Some(pos) = existing.refs.iter().position(|r| *r == link.refs[shared]) else {
                    return false;
                };
                let other = &existing.refs[1 - pos];
                if *other == link.refs[1 - shared] {
                    return false;
                }
                parsed(other).is_some_and(|inner| covers(&new_sides[1 - shared], &inner))
            })
        })
    }

    /// The side of `link` that lies inside `r`, parsed.
    fn anchor_side(&self, r: &Ref, prefix: &str, link: &Link) -> Option<(usize, Ref)> {
        link.refs.iter().enumerate().find_map(|(pos, side)| {
            if !ref_has_prefix(side, prefix) {
                return None;
            }
            match self.parser.parse(side, false) {
                Ok(parsed) if covers(r, &parsed) => Some((pos, parsed)),
                Ok(_) => None,
                Err(e) => {
                    warn!(id = %link.id, reference = %side, error = %e, "skipping unparsable link side");
                    None
                }
            }
        })
    }
}

/// Narrowest string prefix every link inside `r` must start with.
fn query_prefix(r: &Ref) -> String {
    match (r.sections.first(), r.to_sections.first()) {
        (Some(a), Some(b)) if a == b => top_section(r).canonical(),
        _ => r.book.clone(),
    }
}

fn linked_text(
    linked: &Ref,
    source: &dyn TextSource,
    fetched: &mut HashMap<String, SectionText>,
) -> SectionText {
    let top = top_section(linked);
    let whole = fetched
        .entry(top.canonical())
        .or_insert_with(|| source.text_at(&top).unwrap_or_default());
    if linked.sections.len() <= 1 {
        return whole.clone();
    }
    whole.section(&linked.sections[1..], &linked.to_sections[1..])
}
