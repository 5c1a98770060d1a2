use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a link (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(uuid::Uuid);

impl LinkId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkId({})", self.short_id())
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected edge between two canonical refs.
///
/// `link_type` is free-form (`"commentary"`, `"quotation"`, ...); the empty
/// string means untyped. `auto` marks links derived by the system rather than
/// entered by an editor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(rename = "_id", default)]
    pub id: LinkId,
    pub refs: [String; 2],
    #[serde(rename = "type", default)]
    pub link_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_text: Option<String>,
    #[serde(default)]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text_oid: Option<String>,
}

impl Link {
    pub fn new(a: impl Into<String>, b: impl Into<String>, link_type: impl Into<String>) -> Self {
        Self {
            id: LinkId::new(),
            refs: [a.into(), b.into()],
            link_type: link_type.into(),
            anchor_text: None,
            auto: false,
            generated_by: None,
            source_text_oid: None,
        }
    }

    /// Mark as system-derived.
    pub fn generated(mut self, by: impl Into<String>) -> Self {
        self.auto = true;
        self.generated_by = Some(by.into());
        self
    }

    pub fn is_typed(&self) -> bool {
        !self.link_type.is_empty()
    }

    /// Both links join the same two refs, in either order.
    pub fn same_pair(&self, other: &Link) -> bool {
        let [a, b] = &self.refs;
        let [c, d] = &other.refs;
        (a == c && b == d) || (a == d && b == c)
    }

    /// Index (0 or 1) of the side equal to or nested under `ref_prefix`.
    pub fn side_matching(&self, ref_prefix: &str) -> Option<usize> {
        self.refs.iter().position(|r| {
            r.strip_prefix(ref_prefix).is_some_and(|rest| {
                rest.is_empty()
                    || rest.starts_with(':')
                    || rest
                        .strip_prefix(' ')
                        .is_some_and(|r| r.starts_with(|c: char| c.is_ascii_digit()))
            })
        })
    }
}
