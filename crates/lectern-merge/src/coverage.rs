//! Merge-by-coverage.
//!
//! Several stored versions of the same section, ordered by precedence, are
//! combined position by position: each position takes the first non-empty
//! value. Provenance is tracked as one source index per leaf of the result,
//! flattened in document order. Below the first level the mapping from
//! leaves back to their position in the tree is therefore not kept.

use serde::{Deserialize, Serialize};
use tracing::debug;

use lectern_types::TextTree;

/// Result of a coverage merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merged {
    pub text: TextTree,
    /// For every leaf of `text` in document order, the index of the
    /// candidate it came from. `None` where no candidate had text.
    pub sources: Vec<Option<usize>>,
}

impl Merged {
    /// The one candidate that supplied every non-empty leaf, if there is
    /// exactly one.
    pub fn single_source(&self) -> Option<usize> {
        let mut contributors = self.sources.iter().flatten();
        let first = *contributors.next()?;
        contributors.all(|&s| s == first).then_some(first)
    }
}

fn has_text(tree: &TextTree) -> bool {
    matches!(tree, TextTree::Leaf(s) if !s.is_empty())
}

fn merge_level(candidates: &[Option<&TextTree>], sources: &mut Vec<Option<usize>>) -> TextTree {
    let width = candidates
        .iter()
        .flatten()
        .filter(|t| t.is_node())
        .map(|t| t.child_count())
        .max();

    let Some(width) = width else {
        let winner = candidates
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.filter(|t| has_text(t)).map(|t| (i, t)));
        return match winner {
            Some((i, t)) => {
                sources.push(Some(i));
                t.clone()
            }
            None => {
                sources.push(None);
                TextTree::Leaf(String::new())
            }
        };
    };

    let children = (1..=width as u32)
        .map(|k| {
            let column: Vec<Option<&TextTree>> = candidates
                .iter()
                .map(|c| c.filter(|t| t.is_node()).and_then(|t| t.get(k)))
                .collect();
            merge_level(&column, sources)
        })
        .collect();
    TextTree::Node(children)
}

/// Merge `candidates` (highest precedence first) into one tree.
///
/// ```
/// use lectern_merge::merge_by_coverage;
/// use lectern_types::TextTree;
///
/// let merged = merge_by_coverage(&[
///     TextTree::segments(["a", ""]),
///     TextTree::segments(["", "b", "c"]),
/// ]);
/// assert_eq!(merged.text, TextTree::segments(["a", "b", "c"]));
/// assert_eq!(merged.sources, vec![Some(0), Some(1), Some(1)]);
/// ```
pub fn merge_by_coverage(candidates: &[TextTree]) -> Merged {
    let refs: Vec<Option<&TextTree>> = candidates.iter().map(Some).collect();
    let mut sources = Vec::new();
    let text = if refs.iter().flatten().any(|t| t.is_node()) {
        merge_level(&refs, &mut sources)
    } else {
        // Single segments: treat each candidate as a one-element list, then unwrap.
        let wrapped: Vec<TextTree> = candidates
            .iter()
            .map(|t| TextTree::Node(vec![t.clone()]))
            .collect();
        let refs: Vec<Option<&TextTree>> = wrapped.iter().map(Some).collect();
        match merge_level(&refs, &mut sources) {
            TextTree::Node(mut children) if children.len() == 1 => children.remove(0),
            other => other,
        }
    };
    debug!(
        candidates = candidates.len(),
        leaves = sources.len(),
        "merged versions by coverage"
    );
    Merged { text, sources }
}
