//! Structural resize transforms for a work's stored text.
//!
//! Adding a level either pushes every segment one level down
//! (`["One", "Two"]` -> `[["One"], ["Two"]]`) or wraps the whole text as
//! the first section of a new outer level (`["One", "Two"]` ->
//! `[["One", "Two"]]`). Removing a level joins sibling segments with a
//! space, which cannot be undone.

use lectern_types::TextTree;

use crate::error::{MergeError, MergeResult};

/// Push every segment one level deeper.
pub fn upsize(tree: &TextTree) -> TextTree {
    match tree {
        TextTree::Leaf(s) => TextTree::Node(vec![TextTree::Leaf(s.clone())]),
        TextTree::Node(children) => TextTree::Node(children.iter().map(upsize).collect()),
    }
}

/// Wrap the whole tree as the single child of a new outer level.
pub fn wrap(tree: &TextTree) -> TextTree {
    TextTree::Node(vec![tree.clone()])
}

fn downsize_inner(tree: &TextTree) -> TextTree {
    match tree {
        TextTree::Leaf(s) => TextTree::Leaf(s.clone()),
        TextTree::Node(children) if children.is_empty() => TextTree::Leaf(String::new()),
        TextTree::Node(children) if children.iter().any(|c| !c.is_node()) => {
            TextTree::Leaf(tree.leaves().join(" "))
        }
        TextTree::Node(children) => TextTree::Node(children.iter().map(downsize_inner).collect()),
    }
}

/// Remove the innermost level by joining sibling segments with a space.
pub fn downsize(tree: &TextTree) -> TextTree {
    match tree {
        TextTree::Node(children) if children.is_empty() => TextTree::Node(Vec::new()),
        other => downsize_inner(other),
    }
}

/// Change the depth of `tree` by `delta` levels. With `in_place`, added
/// levels wrap the existing text instead of pushing segments down.
pub fn resize(tree: &TextTree, delta: i64, in_place: bool) -> MergeResult<TextTree> {
    if in_place && delta < 0 {
        return Err(MergeError::WrapRequiresUpsize(delta));
    }
    let step: fn(&TextTree) -> TextTree = match (delta > 0, in_place) {
        (true, true) => wrap,
        (true, false) => upsize,
        (false, _) => downsize,
    };
    let mut out = tree.clone();
    for _ in 0..delta.unsigned_abs() {
        out = step(&out);
    }
    Ok(out)
}

/// Levels to add (positive) or remove (negative) going from `from` to `to`
/// section names. A work needs at least one level.
pub fn resize_delta(from: usize, to: usize) -> MergeResult<i64> {
    if to == 0 {
        return Err(MergeError::InvalidDepth { from, to });
    }
    Ok(to as i64 - from as i64)
}
