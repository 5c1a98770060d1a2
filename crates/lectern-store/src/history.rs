//! Change-history collaborator.
//!
//! Every mutation of a text, link, note, or index is reported as an
//! immutable [`ChangeRecord`]. The engine calls the recorder synchronously
//! and treats a failure as non-fatal.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lectern_types::UserId;

use crate::error::{poisoned, StoreResult};
use crate::traits::ref_has_prefix;

/// What kind of mutation a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    EditText,
    AddLink,
    EditLink,
    DeleteLink,
    AddNote,
    EditNote,
    DeleteNote,
    EditIndex,
    RenameTitle,
    RenameVersion,
    DeleteWork,
}

/// One audited mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    /// Canonical ref, title, or record id the change applies to.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
    pub at: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(kind: ChangeKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            old: None,
            new: None,
            actor: None,
            at: Utc::now(),
        }
    }

    pub fn with_old<T: Serialize>(mut self, value: &T) -> StoreResult<Self> {
        self.old = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn with_new<T: Serialize>(mut self, value: &T) -> StoreResult<Self> {
        self.new = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn by(mut self, actor: Option<&UserId>) -> Self {
        self.actor = actor.cloned();
        self
    }
}

/// Receives change records.
pub trait HistoryRecorder: Send + Sync {
    fn record(&self, change: ChangeRecord) -> StoreResult<()>;

    /// Rewrite stored targets after a work is renamed. Returns how many
    /// records changed.
    fn rename_title(&self, _old: &str, _new: &str) -> StoreResult<usize> {
        Ok(0)
    }
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHistory;

impl HistoryRecorder for NoopHistory {
    fn record(&self, _change: ChangeRecord) -> StoreResult<()> {
        Ok(())
    }
}

/// Keeps records in memory, oldest first.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<ChangeRecord>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<ChangeRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryRecorder for InMemoryHistory {
    fn record(&self, change: ChangeRecord) -> StoreResult<()> {
        self.records.write().map_err(poisoned)?.push(change);
        Ok(())
    }

    fn rename_title(&self, old: &str, new: &str) -> StoreResult<usize> {
        let mut records = self.records.write().map_err(poisoned)?;
        let mut changed = 0;
        for record in records.iter_mut() {
            if ref_has_prefix(&record.target, old) {
                record.target = format!("{new}{}", &record.target[old.len()..]);
                changed += 1;
            }
        }
        Ok(changed)
    }
}
