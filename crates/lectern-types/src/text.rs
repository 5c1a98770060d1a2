use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::tree::TextTree;

/// Language of a stored text version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "he")]
    Hebrew,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hebrew => "he",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::English),
            "he" => Ok(Language::Hebrew),
            other => Err(TypeError::InvalidLanguage(other.to_string())),
        }
    }
}

/// Editorial status of a version. Only `Locked` carries behavior: saves that
/// do not bypass the lock are rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionStatus {
    #[default]
    None,
    Locked,
    Other(String),
}

impl VersionStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, VersionStatus::Locked)
    }
}

impl From<String> for VersionStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "" => VersionStatus::None,
            "locked" => VersionStatus::Locked,
            _ => VersionStatus::Other(s),
        }
    }
}

impl From<VersionStatus> for String {
    fn from(status: VersionStatus) -> Self {
        match status {
            VersionStatus::None => String::new(),
            VersionStatus::Locked => "locked".to_string(),
            VersionStatus::Other(s) => s,
        }
    }
}

/// Identity of a stored version: at most one document per key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionKey {
    pub title: String,
    pub language: Language,
    pub version_title: String,
}

impl VersionKey {
    pub fn new(title: impl Into<String>, language: Language, version_title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language,
            version_title: version_title.into(),
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.title, self.language, self.version_title)
    }
}

/// One stored text document: a whole work in one language and version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedText {
    pub title: String,
    pub language: Language,
    pub version_title: String,
    #[serde(default)]
    pub version_source: String,
    #[serde(default)]
    pub status: VersionStatus,
    /// Higher priority versions are preferred when several cover a position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(rename = "chapter", default)]
    pub content: TextTree,
    /// Insertion order, assigned by the store. Breaks priority ties.
    #[serde(default)]
    pub seq: u64,
}

impl VersionedText {
    pub fn new(
        title: impl Into<String>,
        language: Language,
        version_title: impl Into<String>,
        content: TextTree,
    ) -> Self {
        Self {
            title: title.into(),
            language,
            version_title: version_title.into(),
            version_source: String::new(),
            status: VersionStatus::None,
            priority: None,
            content,
            seq: 0,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.version_source = source.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn key(&self) -> VersionKey {
        VersionKey::new(self.title.clone(), self.language, self.version_title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes() {
        assert_eq!("he".parse::<Language>().unwrap(), Language::Hebrew);
        assert_eq!(Language::English.to_string(), "en");
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(TypeError::InvalidLanguage(code)) if code == "fr"
        ));
    }

    #[test]
    fn status_serializes_as_plain_string() {
        assert_eq!(serde_json::to_value(VersionStatus::Locked).unwrap(), "locked");
        assert_eq!(serde_json::to_value(VersionStatus::None).unwrap(), "");
        let other: VersionStatus = serde_json::from_value("review".into()).unwrap();
        assert_eq!(other, VersionStatus::Other("review".into()));
        assert!(!other.is_locked());
    }

    #[test]
    fn versioned_text_wire_shape() {
        let v = VersionedText::new("Genesis", Language::English, "JPS", TextTree::segments(["a"]))
            .with_priority(2);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["versionTitle"], "JPS");
        assert_eq!(json["language"], "en");
        assert_eq!(json["chapter"], serde_json::json!(["a"]));
        let back: VersionedText = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
        assert_eq!(back.key(), VersionKey::new("Genesis", Language::English, "JPS"));
    }
}
