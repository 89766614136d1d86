//! Active-job registry: episode number → supervised fetch subprocess.
//!
//! An entry exists exactly while the orchestrator that created it believes
//! the subprocess is running: written immediately after spawn (before the
//! first poll, so a crash still leaves a discoverable record) and removed as
//! soon as exit is observed. The monitor reads this document to report
//! liveness and to find pids to terminate.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::context::ShowContext;

/// One supervised fetch subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEntry {
    pub pid: u32,
    pub locator: String,
    /// Unix seconds at spawn. Recorded for operators reading the document;
    /// not used to compensate for pid reuse.
    pub started_at: u64,
}

impl ActiveEntry {
    pub fn new(pid: u32, locator: impl Into<String>) -> Self {
        let started_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { pid, locator: locator.into(), started_at }
    }
}

/// Full active-jobs document for one show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveJobs {
    entries: BTreeMap<u32, ActiveEntry>,
}

impl ActiveJobs {
    /// Read the current registry; missing or corrupt documents load as empty.
    pub fn snapshot(ctx: &ShowContext) -> Self {
        super::load_or_default(&ctx.active_path())
    }

    /// Add (or overwrite) one entry and persist the whole document.
    pub fn register(ctx: &ShowContext, episode: u32, entry: ActiveEntry) -> Result<()> {
        let mut jobs = Self::snapshot(ctx);
        jobs.entries.insert(episode, entry);
        super::save(&ctx.active_path(), &jobs)
    }

    /// Remove one entry and persist the whole document.
    pub fn unregister(ctx: &ShowContext, episode: u32) -> Result<()> {
        let mut jobs = Self::snapshot(ctx);
        jobs.entries.remove(&episode);
        super::save(&ctx.active_path(), &jobs)
    }

    /// Delete the registry document entirely (controller cleanup after stop).
    pub fn clear(ctx: &ShowContext) -> Result<()> {
        let path = ctx.active_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ActiveEntry)> {
        self.entries.iter().map(|(ep, entry)| (*ep, entry))
    }

    pub fn get(&self, episode: u32) -> Option<&ActiveEntry> {
        self.entries.get(&episode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
