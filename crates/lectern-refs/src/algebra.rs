//! Ref algebra: widening, span detection and splitting, range expansion, and
//! containment.
//!
//! Everything here is a pure function over [`Ref`] values. Comparisons use
//! the integer section encoding, so Talmud sides compare correctly without
//! looking at their display strings.

use crate::navigation::LengthLookup;
use crate::types::Ref;

/// Zoom out `context` levels from the most specific possible ref. A context
/// of 0 returns the ref unchanged.
pub fn widen(r: &Ref, context: usize) -> Ref {
    if context == 0 {
        return r.clone();
    }
    r.truncated(r.depth().saturating_sub(context))
}

/// The top-level section containing `r`.
pub fn top_section(r: &Ref) -> Ref {
    r.truncated(1)
}

/// The section one level above the segment level.
pub fn section_level(r: &Ref) -> Ref {
    r.truncated(r.depth().saturating_sub(1))
}

/// URL form of a ref: spaces become underscores, except the one separating
/// the title from the first section, which becomes a dot like the others.
pub fn url_form(r: &Ref) -> String {
    let mut url = r.canonical().replace(' ', "_").replace(':', ".");
    if !r.sections.is_empty() {
        if let Some(i) = url.rfind('_') {
            url.replace_range(i..=i, ".");
        }
    }
    url
}

/// True if the endpoints of `r` disagree above the segment level, so the
/// range crosses a section boundary and cannot be served as one section.
pub fn is_spanning(r: &Ref) -> bool {
    let depth = r.depth();
    if depth <= 1 || r.sections.is_empty() {
        return false;
    }
    let levels = r.sections.len().min(depth - 1);
    r.sections[..levels] != r.to_sections[..levels]
}

/// Decompose a spanning ref into one ref per section at the level where the
/// endpoints first diverge. Segment-level endpoints are kept on the first
/// and last pieces: the first runs from the start segment to the end of its
/// section (as reported by `lookup`), the last from segment 1 to the end
/// segment. Non-spanning refs come back unchanged.
pub fn split_span(r: &Ref, lookup: &dyn LengthLookup) -> Vec<Ref> {
    if !is_spanning(r) {
        return vec![r.clone()];
    }
    let Some(point) = r
        .sections
        .iter()
        .zip(&r.to_sections)
        .position(|(a, b)| a != b)
    else {
        return vec![r.clone()];
    };

    let prefix = &r.sections[..point];
    let start = r.sections[point];
    let requested_end = r.to_sections[point];
    // Sections past the last stored one hold nothing; stop there.
    let end = match lookup.segment_count(&r.book, prefix) {
        Some(stored) => requested_end.min(stored.max(start)),
        None => requested_end,
    };
    let segment_endpoints = r.sections.len() == r.depth() && point + 2 == r.depth();

    (start..=end)
        .map(|n| {
            let mut whole = prefix.to_vec();
            whole.push(n);
            if !segment_endpoints {
                return r.with_sections(whole.clone(), whole);
            }
            if n == start {
                match lookup.segment_count(&r.book, &whole) {
                    Some(last) if last >= r.sections[point + 1] => {
                        let mut to = whole;
                        to.push(last);
                        r.with_sections(r.sections.clone(), to)
                    }
                    _ => r.with_sections(whole.clone(), whole),
                }
            } else if n == requested_end {
                let mut from = whole;
                from.push(1);
                r.with_sections(from, r.to_sections.clone())
            } else {
                r.with_sections(whole.clone(), whole)
            }
        })
        .collect()
}

/// Every point in a range that varies only at its last level:
/// `"Genesis 1:2-4"` gives `1:2`, `1:3`, `1:4`. A point ref gives itself.
pub fn range_expand(r: &Ref) -> Vec<Ref> {
    let (Some(&first), Some(&last)) = (r.sections.last(), r.to_sections.last()) else {
        return vec![r.clone()];
    };
    let prefix = &r.sections[..r.sections.len() - 1];
    (first..=last)
        .map(|n| {
            let mut point = prefix.to_vec();
            point.push(n);
            r.with_sections(point.clone(), point)
        })
        .collect()
}

/// True if `inner` lies entirely within `outer`: same work, at least as
/// specific, and both of its endpoints fall in outer's range when compared
/// at outer's level.
pub fn covers(outer: &Ref, inner: &Ref) -> bool {
    if outer.book != inner.book {
        return false;
    }
    let n = outer.sections.len();
    if inner.sections.len() < n || inner.to_sections.len() < n {
        return false;
    }
    outer.sections.as_slice() <= &inner.sections[..n]
        && &inner.to_sections[..n] <= outer.to_sections.as_slice()
}
