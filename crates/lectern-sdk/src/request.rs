use serde::{Deserialize, Serialize};

use lectern_links::AnnotatedLink;
use lectern_types::{Language, TextTree, VersionStatus};

/// What to fetch. Built from a citation and refined with builder methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRequest {
    pub reference: String,
    /// Levels of surrounding text; `None` uses the library default.
    pub context: Option<usize>,
    pub commentary: bool,
    pub version: Option<String>,
    pub language: Option<Language>,
    pub pad: bool,
}

impl TextRequest {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            context: None,
            commentary: true,
            version: None,
            language: None,
            pad: true,
        }
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = Some(context);
        self
    }

    pub fn without_commentary(mut self) -> Self {
        self.commentary = false;
        self
    }

    /// Use one named version for `language`; the other language still
    /// merges all of its versions.
    pub fn with_version(mut self, language: Language, version: impl Into<String>) -> Self {
        self.language = Some(language);
        self.version = Some(version.into());
        self
    }

    pub fn unpadded(mut self) -> Self {
        self.pad = false;
        self
    }
}

/// One available version of a text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub version_title: String,
    pub language: Language,
}

/// Text assembled for a request, in display form.
///
/// `sections` and `to_sections` are display strings: Talmud refs show
/// their daf as `"2a"`, and sections borrowed through a shorthand are
/// hidden.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedText {
    #[serde(rename = "ref")]
    pub reference: String,
    pub book: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_book: Option<String>,
    #[serde(rename = "type")]
    pub category: String,
    pub categories: Vec<String>,
    pub section_names: Vec<String>,
    pub sections: Vec<String>,
    pub to_sections: Vec<String>,

    pub text: TextTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_status: Option<VersionStatus>,
    /// Per-leaf version titles when more than one version contributed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Option<String>>>,

    pub he: TextTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_version_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_version_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_version_status: Option<VersionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_sources: Option<Vec<Option<String>>>,

    #[serde(default)]
    pub spanning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<Vec<AnnotatedLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<VersionSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// A version's worth of text posted to a ref.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSubmission {
    pub version_title: String,
    #[serde(default)]
    pub version_source: String,
    pub language: Language,
    pub text: TextTree,
}

impl TextSubmission {
    pub fn new(language: Language, version_title: impl Into<String>, text: TextTree) -> Self {
        Self {
            version_title: version_title.into(),
            version_source: String::new(),
            language,
            text,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.version_source = source.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let r = TextRequest::new("Genesis 1")
            .with_context(0)
            .without_commentary()
            .with_version(Language::Hebrew, "Tanach with Nikkud")
            .unpadded();
        assert_eq!(r.context, Some(0));
        assert!(!r.commentary);
        assert_eq!(r.language, Some(Language::Hebrew));
        assert_eq!(r.version.as_deref(), Some("Tanach with Nikkud"));
        assert!(!r.pad);
    }

    #[test]
    fn request_defaults() {
        let r = TextRequest::new("Genesis 1:1");
        assert_eq!(r.context, None);
        assert!(r.commentary);
        assert!(r.pad);
    }

    #[test]
    fn submission_from_json() {
        let s: TextSubmission = serde_json::from_str(
            r#"{"versionTitle": "JPS", "language": "en", "text": ["In the beginning"]}"#,
        )
        .unwrap();
        assert_eq!(s.version_title, "JPS");
        assert_eq!(s.text, TextTree::segments(["In the beginning"]));
        assert_eq!(s.version_source, "");
    }
}
