//! Links derived from saved text.
//!
//! Two kinds are derived automatically after a save: commentary links that
//! align a commentary work with the base text it comments on, and citation
//! links for every ref mentioned inside the saved text.

use tracing::{debug, info};

use lectern_refs::{citations_in_text, Ref};
use lectern_types::{Link, TextTree};

use crate::error::{LinkError, LinkResult};
use crate::graph::{LinkGraph, TextSource};

const COMMENTARY_TYPE: &str = "commentary";
const COMMENTARY_GENERATOR: &str = "commentary_links";
const CITATION_GENERATOR: &str = "text_citations";

/// The base-text ref a commentary ref comments on, cut to `levels`
/// sections.
fn base_ref(r: &Ref, levels: usize) -> LinkResult<String> {
    let target = r
        .commentary
        .as_ref()
        .ok_or_else(|| LinkError::Invalid(format!("{} is not a commentary", r.book)))?;
    let cut = r.truncated(levels).canonical();
    Ok(format!("{}{}", target.base_title, &cut[r.book.len()..]))
}

fn child(r: &Ref, n: u32) -> Ref {
    let mut sections = r.sections.clone();
    sections.push(n);
    r.with_sections(sections.clone(), sections)
}

impl LinkGraph {
    /// Align a saved commentary ref with its base text. Returns the number
    /// of new links.
    ///
    /// A ref at full depth is one comment and links to the base segment it
    /// sits under. One level shallower it is a group of comments, each
    /// linked to the same base segment. Anything shallower recurses into
    /// its children.
    pub fn derive_commentary_links(&self, r: &Ref, texts: &dyn TextSource) -> LinkResult<usize> {
        if !r.is_commentary() {
            return Err(LinkError::Invalid(format!("{} is not a commentary", r.book)));
        }
        let point = r.with_sections(r.sections.clone(), r.sections.clone());
        let added = self.align(&point, texts)?;
        info!(reference = %r, added, "derived commentary links");
        Ok(added)
    }

    fn align(&self, r: &Ref, texts: &dyn TextSource) -> LinkResult<usize> {
        let depth = r.depth();
        let level = r.sections.len();

        if level >= depth {
            let link = Link::new(base_ref(r, depth - 1)?, r.canonical(), COMMENTARY_TYPE)
                .generated(COMMENTARY_GENERATOR);
            return Ok(usize::from(self.save_derived(link)?));
        }

        let children = self.child_range(r, texts);
        if level + 1 == depth {
            let base = base_ref(r, level)?;
            let mut added = 0;
            for n in children {
                let link = Link::new(base.clone(), child(r, n).canonical(), COMMENTARY_TYPE)
                    .generated(COMMENTARY_GENERATOR);
                added += usize::from(self.save_derived(link)?);
            }
            return Ok(added);
        }

        children
            .map(|n| self.align(&child(r, n), texts))
            .sum()
    }

    /// Child section numbers to visit under `r`. A whole-work ref uses the
    /// declared length; anything deeper asks the stored text.
    fn child_range(&self, r: &Ref, texts: &dyn TextSource) -> std::ops::RangeInclusive<u32> {
        if r.sections.is_empty() {
            if let Some(length) = r.length {
                return if r.talmud {
                    let first = if r.bavli { 3 } else { 1 };
                    first..=length * 2
                } else {
                    1..=length
                };
            }
        }
        let count = texts.text_at(r).map(|t| t.child_count()).unwrap_or(0);
        1..=count as u32
    }

    /// Link every citation found inside `text` (the text stored at `r`) to
    /// the segment it appears in. Returns the number of new links.
    pub fn derive_text_links(&self, r: &Ref, text: &TextTree) -> LinkResult<usize> {
        let mut added = 0;
        self.scan_tree(r, text, &mut added)?;
        if added > 0 {
            info!(reference = %r, added, "derived citation links");
        }
        Ok(added)
    }

    fn scan_tree(&self, r: &Ref, tree: &TextTree, added: &mut usize) -> LinkResult<()> {
        match tree {
            TextTree::Node(children) => {
                for (i, sub) in children.iter().enumerate() {
                    self.scan_tree(&child(r, i as u32 + 1), sub, added)?;
                }
                Ok(())
            }
            TextTree::Leaf(segment) => {
                let anchor = r.canonical();
                for found in citations_in_text(self.parser().registry(), segment)? {
                    let target = match self.parser().norm_ref(&found, true, 0) {
                        Ok(target) => target,
                        Err(e) => {
                            debug!(citation = %found, error = %e, "ignoring unparsable citation");
                            continue;
                        }
                    };
                    if target == anchor {
                        continue;
                    }
                    let link = Link::new(anchor.clone(), target, "").generated(CITATION_GENERATOR);
                    *added += usize::from(self.save_derived(link)?);
                }
                Ok(())
            }
        }
    }
}
