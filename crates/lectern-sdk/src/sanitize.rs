//! HTML tag stripping for posted text.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use lectern_types::TextTree;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("tag pattern is valid")
});

/// Removes every HTML tag except an allowed set. Allowed tags are kept
/// without their attributes.
#[derive(Clone, Debug)]
pub struct Sanitizer {
    allowed: HashSet<String>,
}

impl Sanitizer {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn clean(&self, segment: &str) -> String {
        TAG_RE
            .replace_all(segment, |caps: &Captures<'_>| {
                let name = caps[2].to_ascii_lowercase();
                if self.allowed.contains(&name) {
                    format!("<{}{name}>", &caps[1])
                } else {
                    String::new()
                }
            })
            .into_owned()
    }

    pub fn clean_tree(&self, tree: &mut TextTree) {
        tree.map_leaves(&mut |s| self.clean(s));
    }
}
