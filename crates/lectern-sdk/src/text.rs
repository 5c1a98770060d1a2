//! Cutting one ref's worth of text out of stored versions and merging the
//! candidates.

use lectern_merge::merge_by_coverage;
use lectern_refs::{LengthLookup, Ref};
use lectern_store::TextStore;
use lectern_types::{TextTree, VersionStatus, VersionedText};

/// Where in a stored document a request points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Address {
    /// Section path to descend.
    pub path: Vec<u32>,
    /// Inclusive child range to keep at the end of `path`.
    pub range: Option<(u32, u32)>,
    /// The request resolves to a single segment.
    pub segment: bool,
}

impl Address {
    /// A point ref at segment level with no context is one segment. With
    /// context, the path is cut `context` levels above the most specific
    /// ref. A range at the last level keeps its parent and slices it.
    pub fn of(r: &Ref, context: usize) -> Self {
        let given = r.sections.len();
        if context > 0 {
            let keep = given.min(r.depth().saturating_sub(context));
            return Self {
                path: r.sections[..keep].to_vec(),
                range: None,
                segment: false,
            };
        }
        if r.is_range() && given > 0 && r.to_sections.len() == given {
            return Self {
                path: r.sections[..given - 1].to_vec(),
                range: Some((r.sections[given - 1], r.to_sections[given - 1])),
                segment: false,
            };
        }
        Self {
            path: r.sections.clone(),
            range: None,
            segment: given > 0 && given == r.depth(),
        }
    }

    /// The addressed part of `content`, or `None` if this document holds
    /// nothing there.
    pub fn extract(&self, content: &TextTree) -> Option<TextTree> {
        let node = content.descend(&self.path)?;
        let out = match self.range {
            Some((from, to)) => node.slice(from, to)?,
            None => node.clone(),
        };
        (!out.is_blank()).then_some(out)
    }

    /// What an address with no stored text resolves to.
    pub fn empty(&self) -> TextTree {
        if self.segment {
            TextTree::Leaf(String::new())
        } else {
            TextTree::Node(Vec::new())
        }
    }
}

/// Version metadata carried onto a response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VersionMeta {
    pub title: String,
    pub source: String,
    pub status: VersionStatus,
}

impl From<&VersionedText> for VersionMeta {
    fn from(v: &VersionedText) -> Self {
        Self {
            title: v.version_title.clone(),
            source: v.version_source.clone(),
            status: v.status.clone(),
        }
    }
}

/// Text for one language after merging.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Assembled {
    pub text: TextTree,
    /// Set when one version supplied everything.
    pub version: Option<VersionMeta>,
    /// Per-leaf version titles when several versions contributed.
    pub sources: Option<Vec<Option<String>>>,
}

/// Extract `address` from each of `docs` (already in precedence order) and
/// merge what they hold.
pub(crate) fn assemble(docs: &[VersionedText], address: &Address) -> Assembled {
    let found: Vec<(&VersionedText, TextTree)> = docs
        .iter()
        .filter_map(|doc| address.extract(&doc.content).map(|text| (doc, text)))
        .collect();

    match found.as_slice() {
        [] => Assembled {
            text: address.empty(),
            version: None,
            sources: None,
        },
        [(doc, text)] => Assembled {
            text: text.clone(),
            version: Some(VersionMeta::from(*doc)),
            sources: None,
        },
        _ => {
            let texts: Vec<TextTree> = found.iter().map(|(_, t)| t.clone()).collect();
            let merged = merge_by_coverage(&texts);
            if let Some(i) = merged.single_source() {
                return Assembled {
                    text: merged.text,
                    version: Some(VersionMeta::from(found[i].0)),
                    sources: None,
                };
            }
            let sources = merged
                .sources
                .iter()
                .map(|s| s.map(|i| found[i].0.version_title.clone()))
                .collect();
            Assembled {
                text: merged.text,
                version: None,
                sources: Some(sources),
            }
        }
    }
}

/// Section sizes as stored: the widest any version of the work has at a
/// path.
pub(crate) struct StoredLengths<'a> {
    pub texts: &'a dyn TextStore,
}

impl LengthLookup for StoredLengths<'_> {
    fn segment_count(&self, book: &str, sections: &[u32]) -> Option<u32> {
        let versions = self.texts.versions(book, None).ok()?;
        versions
            .iter()
            .filter_map(|v| v.content.descend(sections))
            .map(|t| t.child_count() as u32)
            .max()
    }
}
