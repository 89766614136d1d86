//! Durable per-show JSON documents.
//!
//! Each store is a whole document: callers load the full record, mutate it,
//! and persist the full record back. Writes go to a temp file in the same
//! directory and are renamed into place so a crashed writer never leaves a
//! truncated document. A document that is missing or fails to parse loads as
//! empty (fail open): losing cache/status is recoverable, aborting a run
//! mid-flight is not.
//!
//! There is no cross-process locking. The runner is the sole writer of its
//! own progress; a monitor reading concurrently can observe a stale snapshot,
//! which heals on the next read.

pub mod active;
pub mod cache;
pub mod queue;
pub mod status;

pub use active::{ActiveEntry, ActiveJobs};
pub use cache::LocatorCache;
pub use queue::DownloadQueue;
pub use status::StatusRecord;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a JSON document, treating a missing or unparsable file as `T::default()`.
pub(crate) fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => return T::default(),
    };
    match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("corrupt document {}, treating as empty: {}", path.display(), err);
            T::default()
        }
    }
}

/// Persist a JSON document atomically: write a sibling temp file, then rename.
pub(crate) fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_string_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename into {}", path.display()))?;
    Ok(())
}
