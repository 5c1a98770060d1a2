//! Previous/next section navigation.
//!
//! Navigation steps at the section level (one above the segment level).
//! Whether a sibling section exists below the top level can only be known
//! from stored text, so callers inject a [`LengthLookup`].

use crate::types::Ref;

/// Reports how many children a section has in stored text.
///
/// `None` means the lookup cannot tell; `Some(0)` means the section exists
/// in principle but holds nothing.
pub trait LengthLookup {
    fn segment_count(&self, book: &str, sections: &[u32]) -> Option<u32>;
}

impl<F> LengthLookup for F
where
    F: Fn(&str, &[u32]) -> Option<u32>,
{
    fn segment_count(&self, book: &str, sections: &[u32]) -> Option<u32> {
        self(book, sections)
    }
}

/// A lookup that never knows anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLengths;

impl LengthLookup for NoLengths {
    fn segment_count(&self, _book: &str, _sections: &[u32]) -> Option<u32> {
        None
    }
}

fn section_path(r: &Ref) -> Option<Vec<u32>> {
    let level = r.depth().saturating_sub(1).max(1);
    let path: Vec<u32> = r.sections.iter().take(level).copied().collect();
    (!path.is_empty()).then_some(path)
}

fn first_top_section(r: &Ref) -> u32 {
    if r.talmud && r.bavli {
        3
    } else {
        1
    }
}

fn last_top_section(r: &Ref) -> Option<u32> {
    r.length.map(|len| if r.talmud { len.saturating_mul(2) } else { len })
}

fn render(r: &Ref, path: Vec<u32>) -> String {
    r.with_sections(path.clone(), path).canonical()
}

/// Canonical string of the section after `r`, or `None` at the end of the
/// work. A sibling the lookup reports as empty rolls over into the first
/// child of the next parent.
pub fn next_section(r: &Ref, lookup: &dyn LengthLookup) -> Option<String> {
    let mut path = section_path(r)?;
    let last = path.len() - 1;
    path[last] = path[last].checked_add(1)?;

    if last > 0 && lookup.segment_count(&r.book, &path) == Some(0) {
        path.truncate(last);
        path[last - 1] = path[last - 1].checked_add(1)?;
        path.push(1);
    }

    if last_top_section(r).is_some_and(|max| path[0] > max) {
        return None;
    }
    Some(render(r, path))
}

/// Canonical string of the section before `r`, or `None` at the start of the
/// work. Stepping back across a parent lands on that parent's last child
/// when the lookup knows it.
pub fn prev_section(r: &Ref, lookup: &dyn LengthLookup) -> Option<String> {
    let mut path = section_path(r)?;
    let last = path.len() - 1;
    let floor = if last == 0 { first_top_section(r) } else { 1 };

    if path[last] > floor {
        path[last] -= 1;
        return Some(render(r, path));
    }
    if last == 0 {
        return None;
    }

    path.truncate(last);
    let parent_floor = if last == 1 { first_top_section(r) } else { 1 };
    if path[last - 1] <= parent_floor {
        return None;
    }
    path[last - 1] -= 1;
    let tail = lookup
        .segment_count(&r.book, &path)
        .filter(|&n| n > 0)
        .unwrap_or(1);
    path.push(tail);
    Some(render(r, path))
}
