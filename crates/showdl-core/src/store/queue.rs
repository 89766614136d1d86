//! Download queue: the fully-prepared job list handed to the detached runner.
//!
//! The launching process resolves locators, writes this document, and then
//! re-execs itself detached; the runner loop reads it back on the other side
//! of the exec boundary. Removed by the runner once the loop finishes.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::ShowContext;
use crate::job::ResolvedJob;

/// Prepared run for one show: title, origin URL, and resolved jobs in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadQueue {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub jobs: Vec<ResolvedJob>,
}

impl DownloadQueue {
    /// Persist the prepared queue for the detached runner to pick up.
    pub fn save(&self, ctx: &ShowContext) -> Result<()> {
        super::save(&ctx.queue_path(), self)
    }

    /// Load the prepared queue. Unlike the other stores this is not
    /// fail-open: a runner without a queue has nothing meaningful to do.
    pub fn load(ctx: &ShowContext) -> Result<Self> {
        let path = ctx.queue_path();
        if !path.exists() {
            bail!("no download queue at {}", path.display());
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        let queue = serde_json::from_str(&data)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(queue)
    }

    /// Remove the queue document after the run finishes.
    pub fn remove(ctx: &ShowContext) -> Result<()> {
        let path = ctx.queue_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}
