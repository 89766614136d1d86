//! Status document: terminal outcome per episode plus run metadata.
//!
//! Mutated only by the job runner when a fetch subprocess leaves RUNNING;
//! read by the monitor from a separate process. Concurrent monitor reads can
//! be stale (documented race); the runner is the sole writer of outcomes.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::context::ShowContext;
use crate::job::Outcome;

/// Terminal outcome sets plus free-form run metadata for one show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default)]
    pub completed: BTreeSet<u32>,
    #[serde(default)]
    pub failed: BTreeSet<u32>,
    /// Episodes terminated by a stop request. Kept separate from `failed`
    /// so a deliberate stop is distinguishable from a broken fetch.
    #[serde(default)]
    pub cancelled: BTreeSet<u32>,
    /// Original invocation URL, recorded once per show.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl StatusRecord {
    /// Load the status document for a show; absent or corrupt ⇒ empty record.
    pub fn load(ctx: &ShowContext) -> Self {
        super::load_or_default(&ctx.status_path())
    }

    /// Persist the whole record. A present `origin_url` is merged into the
    /// metadata without touching the outcome sets.
    pub fn save(&mut self, ctx: &ShowContext, origin_url: Option<&str>) -> Result<()> {
        if let Some(url) = origin_url {
            self.source_url = Some(url.to_string());
        }
        super::save(&ctx.status_path(), self)
    }

    /// Record a terminal outcome. An episode appears in at most one set.
    pub fn record(&mut self, episode: u32, outcome: Outcome) {
        self.completed.remove(&episode);
        self.failed.remove(&episode);
        self.cancelled.remove(&episode);
        match outcome {
            Outcome::Completed => self.completed.insert(episode),
            Outcome::Failed => self.failed.insert(episode),
            Outcome::Cancelled => self.cancelled.insert(episode),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absent_document_loads_empty() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let record = StatusRecord::load(&ctx);
        assert!(record.completed.is_empty());
        assert!(record.failed.is_empty());
        assert!(record.cancelled.is_empty());
        assert!(record.source_url.is_none());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let mut record = StatusRecord::default();
        record.record(1, Outcome::Completed);
        record.record(2, Outcome::Failed);
        record.record(3, Outcome::Cancelled);
        record.save(&ctx, Some("https://example.com/show")).unwrap();

        let loaded = StatusRecord::load(&ctx);
        assert_eq!(loaded, record);
        assert_eq!(loaded.source_url.as_deref(), Some("https://example.com/show"));
    }

    #[test]
    fn saving_without_origin_preserves_existing_metadata() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let mut record = StatusRecord::default();
        record.save(&ctx, Some("https://example.com/show")).unwrap();

        let mut reloaded = StatusRecord::load(&ctx);
        reloaded.record(4, Outcome::Completed);
        reloaded.save(&ctx, None).unwrap();

        let final_record = StatusRecord::load(&ctx);
        assert_eq!(final_record.source_url.as_deref(), Some("https://example.com/show"));
        assert!(final_record.completed.contains(&4));
    }

    #[test]
    fn episode_appears_in_at_most_one_set() {
        let mut record = StatusRecord::default();
        record.record(9, Outcome::Failed);
        record.record(9, Outcome::Completed);
        assert!(record.completed.contains(&9));
        assert!(!record.failed.contains(&9));
        assert!(!record.cancelled.contains(&9));
    }

    #[test]
    fn two_set_legacy_document_parses() {
        // Documents written before the cancelled set existed.
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        std::fs::write(ctx.status_path(), r#"{"completed": [1, 2], "failed": [5]}"#).unwrap();
        let record = StatusRecord::load(&ctx);
        assert_eq!(record.completed, BTreeSet::from([1, 2]));
        assert_eq!(record.failed, BTreeSet::from([5]));
        assert!(record.cancelled.is_empty());
    }
}
