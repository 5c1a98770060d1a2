//! The resolved citation type.
//!
//! A [`Ref`] is an immutable coordinate into a work: the canonical title and
//! a closed range `sections..=to_sections` of 1-based section numbers. For
//! Talmud works the first section is the integer daf-side encoding (see
//! [`crate::daf`]); only the canonical string renders it as `"2a"`.

use std::fmt;

use serde::{Deserialize, Serialize};

use lectern_types::{CommentaryTarget, WorkIndex};

use crate::daf::section_to_daf;

/// Marks a ref produced by alias expansion. The first `depth` sections were
/// borrowed from the alias target and are hidden when displaying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shorthand {
    pub name: String,
    pub depth: usize,
}

/// A resolved citation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ref {
    pub book: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title: Option<String>,
    pub categories: Vec<String>,
    pub section_names: Vec<String>,
    pub sections: Vec<u32>,
    pub to_sections: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorthand: Option<Shorthand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<CommentaryTarget>,
    pub talmud: bool,
    pub bavli: bool,
}

impl Ref {
    /// A whole-work ref (no sections) for `index`.
    pub fn for_work(index: &WorkIndex) -> Self {
        Self {
            book: index.title.clone(),
            he_title: index.he_title.clone(),
            categories: index.categories.clone(),
            section_names: index.section_names.clone(),
            sections: Vec::new(),
            to_sections: Vec::new(),
            length: index.length,
            shorthand: None,
            commentary: index.commentary.clone(),
            talmud: index.is_talmud(),
            bavli: index.is_bavli(),
        }
    }

    pub fn depth(&self) -> usize {
        self.section_names.len()
    }

    pub fn root_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    /// A derived `"<Commentator> on <Base>"` ref.
    pub fn is_commentary(&self) -> bool {
        self.commentary.is_some()
    }

    pub fn is_range(&self) -> bool {
        self.sections != self.to_sections
    }

    /// Copy of this ref addressing `sections..=to_sections`.
    pub fn with_sections(&self, sections: Vec<u32>, to_sections: Vec<u32>) -> Self {
        Self {
            sections,
            to_sections,
            ..self.clone()
        }
    }

    /// Copy of this ref cut to at most `levels` section levels.
    pub fn truncated(&self, levels: usize) -> Self {
        let cut = |v: &[u32]| v[..v.len().min(levels)].to_vec();
        self.with_sections(cut(&self.sections), cut(&self.to_sections))
    }

    /// The canonical string, e.g. `"Genesis 1:2-5"` or `"Shabbat 13a:3-14"`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Prefix that canonical strings of this work start with.
    pub fn book_prefix(&self) -> String {
        format!("{} ", self.book)
    }

    fn fmt_point(&self, sections: &[u32], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in sections.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            if i == 0 && self.talmud {
                f.write_str(&section_to_daf(*s))?;
            } else {
                write!(f, "{s}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.book)?;
        if self.sections.is_empty() {
            return Ok(());
        }
        f.write_str(" ")?;
        self.fmt_point(&self.sections, f)?;

        let diverge = self
            .sections
            .iter()
            .zip(&self.to_sections)
            .position(|(a, b)| a != b);
        if let Some(i) = diverge {
            f.write_str("-")?;
            if i == 0 {
                self.fmt_point(&self.to_sections, f)?;
            } else {
                let tail = self.to_sections[i..]
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(":");
                f.write_str(&tail)?;
            }
        }
        Ok(())
    }
}
