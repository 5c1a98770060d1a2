//! Search-indexer collaborator.
//!
//! After a successful text save the engine posts an [`IndexJob`] and moves
//! on. Delivery is fire-and-forget: a gone consumer is logged, not reported.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use lectern_types::Language;

/// Request to re-index one saved ref of one version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexJob {
    #[serde(rename = "ref")]
    pub reference: String,
    pub version_title: String,
    pub language: Language,
}

impl IndexJob {
    pub fn new(reference: impl Into<String>, version_title: impl Into<String>, language: Language) -> Self {
        Self {
            reference: reference.into(),
            version_title: version_title.into(),
            language,
        }
    }
}

pub trait SearchIndexer: Send + Sync {
    fn notify(&self, job: IndexJob);
}

/// Drops every job.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndexer;

impl SearchIndexer for NoopIndexer {
    fn notify(&self, _job: IndexJob) {}
}

/// Hands jobs to an async consumer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelIndexer {
    tx: mpsc::UnboundedSender<IndexJob>,
}

impl ChannelIndexer {
    /// Create an indexer and the receiver a worker task should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<IndexJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SearchIndexer for ChannelIndexer {
    fn notify(&self, job: IndexJob) {
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job) {
            warn!(reference = %job.reference, version = %job.version_title, "search indexer is gone, dropping job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jobs_reach_the_worker_in_order() {
        let (indexer, mut rx) = ChannelIndexer::channel();
        let worker = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(job) = rx.recv().await {
                seen.push(job.reference);
            }
            seen
        });

        indexer.notify(IndexJob::new("Genesis 1:1", "JPS", Language::English));
        indexer.notify(IndexJob::new("Genesis 1:2", "JPS", Language::English));
        drop(indexer);

        let seen = worker.await.unwrap();
        assert_eq!(seen, vec!["Genesis 1:1", "Genesis 1:2"]);
    }

    #[tokio::test]
    async fn closed_channel_is_not_an_error() {
        let (indexer, rx) = ChannelIndexer::channel();
        drop(rx);
        indexer.notify(IndexJob::new("Genesis 1:1", "JPS", Language::English));
    }

    #[test]
    fn job_serializes_with_ref_key() {
        let job = IndexJob::new("Job 4:5", "JPS", Language::Hebrew);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["ref"], "Job 4:5");
        assert_eq!(json["versionTitle"], "JPS");
    }
}
