//! Per-work metadata records.
//!
//! A [`WorkIndex`] describes one literary work: its canonical title and
//! search aliases, the names of its section levels (which fix its depth),
//! its category lineage, and an optional bound on its top-level length.
//!
//! Commentary works come in two shapes. A bare commentator record (root
//! category `"Commentary"`, no [`CommentaryTarget`]) cannot be cited on its
//! own. A derived record such as `"Rashi on Genesis"` is synthesized from a
//! commentator and a base work by [`WorkIndex::commentary_on`].

use serde::{Deserialize, Serialize};

/// Root categories whose works may serve as the base of a commentary.
pub const BASE_TEXT_CATEGORIES: &[&str] = &["Tanach", "Mishnah", "Talmud", "Halakhah"];

/// Hebrew connective used when joining a commentator and a base work title.
const HEBREW_ON: &str = "\u{05E2}\u{05DC}";

/// A registered shorthand that expands to a canonical ref before parsing.
///
/// For example `{ from: "Hilchot Shabbat", to: "Mishneh Torah 3" }` lets a
/// reader cite `"Hilchot Shabbat 2:4"` for `"Mishneh Torah 3:2:4"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub from: String,
    pub to: String,
}

impl Alias {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Linkage from a derived commentary record back to its base work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentaryTarget {
    /// Commentator name as cited (e.g. "Rashi").
    pub commentator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_commentator: Option<String>,
    /// Canonical title of the base work (e.g. "Genesis").
    pub base_title: String,
    /// Category path of the base work, root first.
    pub base_categories: Vec<String>,
}

/// Metadata describing one literary work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkIndex {
    /// Canonical title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title: Option<String>,
    /// Latin-script search aliases, including the title itself.
    #[serde(default)]
    pub title_variants: Vec<String>,
    /// Hebrew-script titles used by the Hebrew citation grammar.
    #[serde(default)]
    pub he_title_variants: Vec<String>,
    /// Names of each section level, outermost first. Defines the depth.
    pub section_names: Vec<String>,
    /// Category lineage, root first.
    pub categories: Vec<String>,
    /// Upper bound on the top-level section number (dafs for Talmud).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, rename = "maps")]
    pub aliases: Vec<Alias>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<CommentaryTarget>,
}

impl WorkIndex {
    /// Create a record whose only title variant is its title.
    pub fn new(
        title: impl Into<String>,
        section_names: &[&str],
        categories: &[&str],
    ) -> Self {
        let title = title.into();
        Self {
            title_variants: vec![title.clone()],
            title,
            he_title: None,
            he_title_variants: Vec::new(),
            section_names: section_names.iter().map(|s| s.to_string()).collect(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
            length: None,
            aliases: Vec::new(),
            commentary: None,
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_variants(mut self, variants: &[&str]) -> Self {
        for v in variants {
            if !self.title_variants.iter().any(|existing| existing == v) {
                self.title_variants.push(v.to_string());
            }
        }
        self
    }

    /// Set the Hebrew title; it also becomes the first Hebrew variant.
    pub fn with_hebrew(mut self, he_title: &str, variants: &[&str]) -> Self {
        self.he_title = Some(he_title.to_string());
        self.he_title_variants = std::iter::once(he_title)
            .chain(variants.iter().copied())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        self.aliases.push(Alias::new(from, to));
        self
    }

    /// Number of section levels.
    pub fn depth(&self) -> usize {
        self.section_names.len()
    }

    /// The root category, or `""` for a malformed record without categories.
    pub fn root_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    /// A commentator record that has not been paired with a base work.
    pub fn is_commentator(&self) -> bool {
        self.root_category() == "Commentary" && self.commentary.is_none()
    }

    /// True when this work may be the base of a derived commentary.
    pub fn is_base_text(&self) -> bool {
        BASE_TEXT_CATEGORIES.contains(&self.root_category())
    }

    /// Talmud, or a commentary whose base work is Talmud. These works are
    /// addressed by daf and amud at the top level.
    pub fn is_talmud(&self) -> bool {
        match self.root_category() {
            "Talmud" => true,
            "Commentary" => self
                .commentary
                .as_ref()
                .and_then(|c| c.base_categories.first())
                .is_some_and(|root| root == "Talmud"),
            _ => false,
        }
    }

    /// The Babylonian Talmud starts at daf 2a rather than 1a.
    pub fn is_bavli(&self) -> bool {
        self.categories.iter().any(|c| c == "Bavli")
    }

    /// Returns `true` if `name` is the title or one of its variants.
    pub fn has_variant(&self, name: &str) -> bool {
        self.title == name || self.title_variants.iter().any(|v| v == name)
    }

    /// Synthesize the derived record for this commentator on `base`.
    ///
    /// `"Rashi"` on `"Genesis"` (`["Chapter", "Verse"]`, `["Tanach", "Torah"]`)
    /// yields `"Rashi on Genesis"` with sections `["Chapter", "Verse",
    /// "Comment"]` and categories `["Commentary", "Tanach", "Torah",
    /// "Genesis"]`, inheriting the base work's length.
    pub fn commentary_on(&self, base: &WorkIndex) -> WorkIndex {
        let title = format!("{} on {}", self.title, base.title);
        let he_title = match (&self.he_title, &base.he_title) {
            (Some(he), Some(base_he)) => Some(format!("{he} {HEBREW_ON} {base_he}")),
            _ => None,
        };

        let mut section_names = base.section_names.clone();
        section_names.push("Comment".to_string());

        let mut categories = vec!["Commentary".to_string()];
        categories.extend(base.categories.iter().cloned());
        categories.push(base.title.clone());

        WorkIndex {
            title_variants: vec![title.clone()],
            title,
            he_title,
            he_title_variants: Vec::new(),
            section_names,
            categories,
            length: base.length,
            aliases: Vec::new(),
            commentary: Some(CommentaryTarget {
                commentator: self.title.clone(),
                he_commentator: self.he_title.clone(),
                base_title: base.title.clone(),
                base_categories: base.categories.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> WorkIndex {
        WorkIndex::new("Genesis", &["Chapter", "Verse"], &["Tanach", "Torah"])
            .with_length(50)
            .with_variants(&["Bereishit", "Gen"])
            .with_hebrew("בראשית", &[])
    }

    fn rashi() -> WorkIndex {
        WorkIndex::new("Rashi", &["Chapter", "Verse", "Comment"], &["Commentary"])
            .with_hebrew("רש\"י", &[])
    }

    #[test]
    fn depth_follows_section_names() {
        assert_eq!(genesis().depth(), 2);
        assert_eq!(rashi().depth(), 3);
    }

    #[test]
    fn title_is_a_variant() {
        let g = genesis();
        assert!(g.has_variant("Genesis"));
        assert!(g.has_variant("Gen"));
        assert!(!g.has_variant("Exodus"));
    }

    #[test]
    fn bare_commentator_is_detected() {
        assert!(rashi().is_commentator());
        assert!(!genesis().is_commentator());
    }

    #[test]
    fn commentary_synthesis() {
        let derived = rashi().commentary_on(&genesis());
        assert_eq!(derived.title, "Rashi on Genesis");
        assert_eq!(derived.section_names, vec!["Chapter", "Verse", "Comment"]);
        assert_eq!(
            derived.categories,
            vec!["Commentary", "Tanach", "Torah", "Genesis"]
        );
        assert_eq!(derived.length, Some(50));
        assert!(!derived.is_commentator());
        let target = derived.commentary.as_ref().unwrap();
        assert_eq!(target.base_title, "Genesis");
        assert_eq!(target.commentator, "Rashi");
        assert_eq!(derived.he_title.as_deref(), Some("רש\"י על בראשית"));
    }

    #[test]
    fn talmud_detection_covers_commentary() {
        let shabbat = WorkIndex::new("Shabbat", &["Daf", "Line"], &["Talmud", "Bavli", "Seder Moed"])
            .with_length(157);
        assert!(shabbat.is_talmud());
        assert!(shabbat.is_bavli());

        let derived = rashi().commentary_on(&shabbat);
        assert!(derived.is_talmud());
        assert!(derived.is_bavli());
        assert!(!rashi().commentary_on(&genesis()).is_talmud());
    }

    #[test]
    fn serde_uses_maps_field_for_aliases() {
        let idx = genesis().with_alias("Bereshit Rabbati", "Genesis 1");
        let json = serde_json::to_value(&idx).unwrap();
        assert_eq!(json["maps"][0]["from"], "Bereshit Rabbati");
        assert_eq!(json["sectionNames"][0], "Chapter");
        let back: WorkIndex = serde_json::from_value(json).unwrap();
        assert_eq!(back, idx);
    }
}
