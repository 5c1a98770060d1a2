//! Client-facing shapes for links and notes.
//!
//! A stored link knows only its two ref strings. When it is returned for a
//! queried ref it is oriented (the side inside the query is the anchor) and
//! decorated with what a reader pane needs to label it.

use serde::{Deserialize, Serialize};

use lectern_refs::Ref;
use lectern_types::{Link, LinkId, Note, NoteId, TextTree, UserId};

/// A link seen from one of its sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedLink {
    #[serde(rename = "_id")]
    pub id: LinkId,
    /// Root category of the linked work.
    pub category: String,
    #[serde(rename = "type")]
    pub link_type: String,
    /// Canonical string of the linked (far) side.
    #[serde(rename = "ref")]
    pub reference: String,
    pub anchor_ref: String,
    pub source_ref: String,
    /// Last section number of the anchor, 0 for a whole-work anchor.
    pub anchor_verse: u32,
    /// Comment number on a commentary side, otherwise 0.
    pub commentary_num: u32,
    pub anchor_text: String,
    pub commentator: String,
    pub he_commentator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub he: Option<TextTree>,
}

impl AnnotatedLink {
    /// Orient `link` with `anchor` as the queried side and `linked` as the
    /// other. `query` is the canonical string of the ref that was asked for.
    pub fn new(link: &Link, anchor: &Ref, linked: &Ref, query: &str) -> Self {
        let category = linked.root_category().to_string();
        let reference = linked.canonical();
        let fallback_he = |label: &str| linked.he_title.clone().unwrap_or_else(|| label.to_string());

        let (commentator, he_commentator) = if category == "Commentary" {
            match &linked.commentary {
                // The query already names the base text, so the commentator
                // name alone is enough.
                Some(target) if reference.contains(query) => (
                    target.commentator.clone(),
                    target
                        .he_commentator
                        .clone()
                        .unwrap_or_else(|| target.commentator.clone()),
                ),
                _ => (reference.clone(), fallback_he(&reference)),
            }
        } else {
            (linked.book.clone(), fallback_he(&linked.book))
        };

        let commentary_num = if category == "Commentary" {
            linked.sections.last().copied().unwrap_or(0)
        } else {
            0
        };

        Self {
            id: link.id,
            category,
            link_type: link.link_type.clone(),
            source_ref: reference.clone(),
            reference,
            anchor_ref: anchor.canonical(),
            anchor_verse: anchor.sections.last().copied().unwrap_or(0),
            commentary_num,
            anchor_text: link.anchor_text.clone().unwrap_or_default(),
            commentator,
            he_commentator,
            he_title: linked.he_title.clone(),
            text: None,
            he: None,
        }
    }
}

/// A note as shown next to the text it annotates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedNote {
    #[serde(rename = "_id")]
    pub id: NoteId,
    pub category: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub owner: UserId,
    pub anchor_ref: String,
    pub anchor_verse: u32,
    pub anchor_text: String,
    pub public: bool,
    pub commentator: String,
    pub title: String,
    pub text: String,
}

impl AnnotatedNote {
    /// Label `note` for `viewer`. Notes written by someone else carry their
    /// title in the text and are attributed to the owner.
    pub fn new(note: &Note, anchor: &Ref, viewer: Option<&UserId>) -> Self {
        let foreign = viewer != Some(&note.owner);
        let text = if foreign && !note.title.is_empty() {
            format!("{} - {}", note.title, note.text)
        } else {
            note.text.clone()
        };
        Self {
            id: note.id,
            category: "Notes".to_string(),
            note_type: "note".to_string(),
            owner: note.owner.clone(),
            anchor_ref: note.anchor.clone(),
            anchor_verse: anchor.sections.last().copied().unwrap_or(0),
            anchor_text: note.anchor_text.clone().unwrap_or_default(),
            public: note.public,
            commentator: note.owner.to_string(),
            title: note.title.clone(),
            text,
        }
    }
}
