//! The jagged text tree.
//!
//! A work's content is a variable-depth nested array whose leaves are text
//! segments. [`TextTree`] models it as a recursive tagged variant and
//! serializes untagged, so the JSON form is the familiar nested array:
//! `[["In the beginning", "And the earth"], ["Thus the heavens"]]`.
//!
//! Section addresses passed to the accessors below are 1-based, matching
//! citation numbering.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A node in a jagged text array: a segment or a list of sub-trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextTree {
    Leaf(String),
    Node(Vec<TextTree>),
}

impl Default for TextTree {
    fn default() -> Self {
        TextTree::Node(Vec::new())
    }
}

impl From<&str> for TextTree {
    fn from(s: &str) -> Self {
        TextTree::Leaf(s.to_string())
    }
}

impl From<Vec<TextTree>> for TextTree {
    fn from(children: Vec<TextTree>) -> Self {
        TextTree::Node(children)
    }
}

impl TextTree {
    pub fn leaf(s: impl Into<String>) -> Self {
        TextTree::Leaf(s.into())
    }

    pub fn node(children: Vec<TextTree>) -> Self {
        TextTree::Node(children)
    }

    /// A depth-1 node holding one leaf per segment.
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TextTree::Node(segments.into_iter().map(|s| TextTree::Leaf(s.into())).collect())
    }

    /// Depth-checked constructor: accept `self` only if its nesting depth is
    /// exactly `expected`.
    pub fn checked(self, expected: usize) -> Result<Self, TypeError> {
        let actual = self.depth();
        if actual != expected {
            return Err(TypeError::StructureMismatch { expected, actual });
        }
        Ok(self)
    }

    /// Nesting depth. A leaf has depth 0, a node of leaves depth 1.
    ///
    /// A level only counts when every element in it is a node, so
    /// `[[], ""]` has depth 1. The first child decides the depth below.
    pub fn depth(&self) -> usize {
        match self {
            TextTree::Leaf(_) => 0,
            TextTree::Node(children) => {
                if !children.is_empty() && children.iter().all(TextTree::is_node) {
                    1 + children[0].depth()
                } else {
                    1
                }
            }
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, TextTree::Node(_))
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            TextTree::Leaf(s) => Some(s),
            TextTree::Node(_) => None,
        }
    }

    /// An empty string or an empty list.
    pub fn is_blank(&self) -> bool {
        match self {
            TextTree::Leaf(s) => s.is_empty(),
            TextTree::Node(children) => children.is_empty(),
        }
    }

    /// True when no leaf anywhere carries text.
    pub fn is_text_empty(&self) -> bool {
        self.leaves().iter().all(|s| s.is_empty())
    }

    /// Number of direct children (0 for a leaf).
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    pub fn children(&self) -> &[TextTree] {
        match self {
            TextTree::Leaf(_) => &[],
            TextTree::Node(children) => children,
        }
    }

    /// The child at 1-based position `index`.
    pub fn get(&self, index: u32) -> Option<&TextTree> {
        let i = (index as usize).checked_sub(1)?;
        self.children().get(i)
    }

    /// Follow a 1-based section path. `None` if any step is missing or a
    /// leaf is reached before the path is exhausted.
    pub fn descend(&self, path: &[u32]) -> Option<&TextTree> {
        path.iter().try_fold(self, |tree, &i| tree.get(i))
    }

    /// Children `start..=end` (1-based, clamped to what exists). `None` for a
    /// leaf.
    pub fn slice(&self, start: u32, end: u32) -> Option<TextTree> {
        let TextTree::Node(children) = self else {
            return None;
        };
        let from = (start.max(1) as usize - 1).min(children.len());
        let to = (end as usize).min(children.len()).max(from);
        Some(TextTree::Node(children[from..to].to_vec()))
    }

    /// Extract the part of this tree addressed by `sections..=to_sections`.
    ///
    /// Addresses that fall outside the stored data yield an empty leaf
    /// rather than an error.
    pub fn section(&self, sections: &[u32], to_sections: &[u32]) -> TextTree {
        if sections.is_empty() {
            return self.clone();
        }
        if self.is_blank() {
            return TextTree::Leaf(String::new());
        }
        let to = if to_sections.len() == sections.len() {
            to_sections
        } else {
            sections
        };

        if sections[0] == to[0] {
            match self.get(sections[0]) {
                None => TextTree::Leaf(String::new()),
                Some(child) if sections.len() == 1 => child.clone(),
                Some(child) => child.section(&sections[1..], &to[1..]),
            }
        } else {
            self.slice(sections[0], to[0])
                .unwrap_or_else(|| TextTree::Leaf(String::new()))
        }
    }

    /// Write `value` at a 1-based section `path`, padding any missing
    /// siblings on the way down.
    ///
    /// `depth` is the declared depth of the whole work. Padding at the
    /// terminal level is an empty segment; above it, an empty list. A leaf
    /// found where a list is needed is wrapped into a one-element list. An
    /// empty path replaces the whole tree.
    pub fn set_at(&mut self, path: &[u32], value: TextTree, depth: usize) {
        self.set_at_level(path, value, depth, 0);
    }

    fn set_at_level(&mut self, path: &[u32], value: TextTree, depth: usize, level: usize) {
        let Some((&head, rest)) = path.split_first() else {
            *self = value;
            return;
        };

        if let TextTree::Leaf(s) = self {
            *self = if s.is_empty() {
                TextTree::Node(Vec::new())
            } else {
                TextTree::Node(vec![TextTree::Leaf(std::mem::take(s))])
            };
        }

        if let TextTree::Node(children) = self {
            let idx = head.max(1) as usize - 1;
            let pad = if level + 1 >= depth {
                TextTree::Leaf(String::new())
            } else {
                TextTree::Node(Vec::new())
            };
            while children.len() <= idx {
                children.push(pad.clone());
            }
            children[idx].set_at_level(rest, value, depth, level + 1);
        }
    }

    /// Every leaf in document order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TextTree::Leaf(s) => out.push(s),
            TextTree::Node(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Rewrite every leaf in place.
    pub fn map_leaves<F>(&mut self, f: &mut F)
    where
        F: FnMut(&str) -> String,
    {
        match self {
            TextTree::Leaf(s) => *s = f(s),
            TextTree::Node(children) => {
                for child in children {
                    child.map_leaves(f);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapters() -> TextTree {
        TextTree::node(vec![
            TextTree::segments(["1:1", "1:2", "1:3"]),
            TextTree::segments(["2:1", "2:2"]),
        ])
    }

    #[test]
    fn depth_counts_uniform_levels() {
        assert_eq!(TextTree::leaf("x").depth(), 0);
        assert_eq!(TextTree::default().depth(), 1);
        assert_eq!(TextTree::segments(["a", "b"]).depth(), 1);
        assert_eq!(chapters().depth(), 2);
        let mixed = TextTree::node(vec![TextTree::default(), TextTree::leaf("")]);
        assert_eq!(mixed.depth(), 1);
    }

    #[test]
    fn checked_rejects_wrong_depth() {
        assert!(chapters().checked(2).is_ok());
        assert_eq!(
            chapters().checked(1),
            Err(TypeError::StructureMismatch {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn descend_and_get_are_one_based() {
        let t = chapters();
        assert_eq!(t.descend(&[2, 1]).and_then(TextTree::as_leaf), Some("2:1"));
        assert!(t.descend(&[3]).is_none());
        assert!(t.descend(&[1, 1, 1]).is_none());
        assert!(t.get(0).is_none());
    }

    #[test]
    fn slice_clamps_to_stored_length() {
        let chapter = TextTree::segments(["a", "b", "c"]);
        assert_eq!(chapter.slice(2, 3), Some(TextTree::segments(["b", "c"])));
        assert_eq!(chapter.slice(2, 10), Some(TextTree::segments(["b", "c"])));
        assert_eq!(chapter.slice(5, 6), Some(TextTree::default()));
        assert_eq!(TextTree::leaf("a").slice(1, 1), None);
    }

    #[test]
    fn section_extracts_points_and_ranges() {
        let t = chapters();
        assert_eq!(t.section(&[1, 2], &[1, 2]), TextTree::leaf("1:2"));
        assert_eq!(t.section(&[1, 2], &[1, 3]), TextTree::segments(["1:2", "1:3"]));
        assert_eq!(t.section(&[2], &[2]), TextTree::segments(["2:1", "2:2"]));
        assert_eq!(t.section(&[], &[]), t);
        assert_eq!(t.section(&[9, 1], &[9, 1]), TextTree::leaf(""));
    }

    #[test]
    fn set_at_pads_missing_positions() {
        let mut t = TextTree::default();
        t.set_at(&[2, 3], TextTree::leaf("x"), 2);
        assert_eq!(
            t,
            TextTree::node(vec![
                TextTree::default(),
                TextTree::segments(["", "", "x"]),
            ])
        );
    }

    #[test]
    fn set_at_depth_three_pads_lists_above_terminal_level() {
        let mut t = TextTree::default();
        t.set_at(&[1, 2, 2], TextTree::leaf("c"), 3);
        assert_eq!(
            t,
            TextTree::node(vec![TextTree::node(vec![
                TextTree::default(),
                TextTree::segments(["", "c"]),
            ])])
        );
    }

    #[test]
    fn set_at_wraps_leaf_found_mid_path() {
        let mut t = TextTree::node(vec![TextTree::leaf("whole chapter")]);
        t.set_at(&[1, 2], TextTree::leaf("second"), 2);
        assert_eq!(t, TextTree::node(vec![TextTree::segments(["whole chapter", "second"])]));
    }

    #[test]
    fn set_at_empty_path_replaces_everything() {
        let mut t = chapters();
        t.set_at(&[], TextTree::segments(["only"]), 1);
        assert_eq!(t, TextTree::segments(["only"]));
    }

    #[test]
    fn text_emptiness() {
        assert!(TextTree::node(vec![TextTree::segments(["", ""])]).is_text_empty());
        assert!(!chapters().is_text_empty());
        assert!(TextTree::leaf("").is_blank());
        assert!(!TextTree::node(vec![TextTree::leaf("")]).is_blank());
    }

    #[test]
    fn serializes_as_plain_nested_arrays() {
        let json = serde_json::to_string(&chapters()).unwrap();
        assert_eq!(json, r#"[["1:1","1:2","1:3"],["2:1","2:2"]]"#);
        let back: TextTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chapters());
    }

    #[test]
    fn map_leaves_rewrites_all_segments() {
        let mut t = chapters();
        t.map_leaves(&mut |s| s.replace(':', "."));
        assert_eq!(t.leaves(), vec!["1.1", "1.2", "1.3", "2.1", "2.2"]);
    }

    mod props {
        use crate::tree::TextTree;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn set_then_descend_finds_value(
                path in proptest::collection::vec(1u32..6, 1..4),
                text in "[a-z]{1,8}",
            ) {
                let depth = path.len();
                let mut t = TextTree::default();
                t.set_at(&path, TextTree::leaf(text.clone()), depth);
                prop_assert_eq!(t.descend(&path).and_then(TextTree::as_leaf), Some(text.as_str()));
            }
        }
    }
}
