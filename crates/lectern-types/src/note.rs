use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Unique identifier for a note (UUID v7).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(uuid::Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self.short_id())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity of an account that owns notes and makes edits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(TypeError::InvalidId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user annotation anchored to a canonical ref.
///
/// Public notes are visible to everyone; private ones only to their owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id", default)]
    pub id: NoteId,
    #[serde(rename = "ref")]
    pub anchor: String,
    pub owner: UserId,
    pub text: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
}

impl Note {
    pub fn new(anchor: impl Into<String>, owner: UserId, text: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            anchor: anchor.into(),
            owner,
            text: text.into(),
            public: false,
            title: String::new(),
            anchor_text: None,
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn visible_to(&self, viewer: Option<&UserId>) -> bool {
        self.public || viewer == Some(&self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_is_rejected() {
        assert!(UserId::new("  ").is_err());
        assert_eq!(UserId::new("u1").unwrap().as_str(), "u1");
    }

    #[test]
    fn visibility() {
        let owner = UserId::new("owner").unwrap();
        let other = UserId::new("other").unwrap();
        let private = Note::new("Genesis 1:1", owner.clone(), "mine");
        assert!(private.visible_to(Some(&owner)));
        assert!(!private.visible_to(Some(&other)));
        assert!(!private.visible_to(None));
        assert!(private.clone().public().visible_to(None));
    }

    #[test]
    fn anchor_serializes_as_ref() {
        let note = Note::new("Genesis 1:1", UserId::new("u").unwrap(), "t");
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["ref"], "Genesis 1:1");
        assert_eq!(json["owner"], "u");
    }
}
