//! Per-show context: output directory plus every derived file path.
//!
//! All durable state lives in the show's output directory so a later
//! `showdl monitor` invocation can find it without any shared memory.
//! Store operations take a `ShowContext` explicitly; there is no
//! process-wide default directory.

use std::path::{Path, PathBuf};

/// Output directory for one show and the documents the orchestrator keeps in it.
#[derive(Debug, Clone)]
pub struct ShowContext {
    output_dir: PathBuf,
}

impl ShowContext {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)
    }

    /// Episode id → resolved stream locator.
    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join("locator_cache.json")
    }

    /// Terminal outcomes per episode plus run metadata.
    pub fn status_path(&self) -> PathBuf {
        self.output_dir.join("download_status.json")
    }

    /// Currently supervised fetch subprocesses.
    pub fn active_path(&self) -> PathBuf {
        self.output_dir.join("active_downloads.json")
    }

    /// Marker file requesting cooperative shutdown.
    pub fn stop_flag_path(&self) -> PathBuf {
        self.output_dir.join("stop_flag")
    }

    /// Prepared job list handed from the launching side to the detached runner.
    pub fn queue_path(&self) -> PathBuf {
        self.output_dir.join("download_queue.json")
    }

    /// Pid of the detached runner process.
    pub fn runner_pid_path(&self) -> PathBuf {
        self.output_dir.join("download_manager.pid")
    }

    /// Fetch subprocess output for one episode.
    pub fn progress_log_path(&self, episode: u32) -> PathBuf {
        self.output_dir.join(format!("episode_{episode}_progress.log"))
    }
}
