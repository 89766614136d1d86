//! Monitor/controller: inspect or stop a run from a separate process.
//!
//! Coordinates with the detached runner exclusively through the durable
//! documents in the show directory; there is no IPC channel. A snapshot read
//! concurrently with a runner write can be stale and heals on the next read.

use anyhow::Result;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::context::ShowContext;
use crate::daemon;
use crate::process;
use crate::progress;
use crate::stop;
use crate::store::{ActiveJobs, StatusRecord};

/// One active-registry entry with liveness and parsed progress.
///
/// `alive` is a signal-0 probe of the recorded pid; after a runner crash the
/// OS may have reused the pid, so a stale entry can read alive. Known
/// limitation, reported as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveReport {
    pub episode: u32,
    pub pid: u32,
    pub alive: bool,
    pub progress: Option<f64>,
}

/// Everything `showdl monitor` prints: terminal sets plus active jobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub completed: BTreeSet<u32>,
    pub failed: BTreeSet<u32>,
    pub cancelled: BTreeSet<u32>,
    pub source_url: Option<String>,
    pub active: Vec<ActiveReport>,
}

/// Read the three durable stores and assemble a point-in-time report.
pub fn snapshot(ctx: &ShowContext) -> StatusReport {
    let status = StatusRecord::load(ctx);
    let jobs = ActiveJobs::snapshot(ctx);
    let active = jobs
        .iter()
        .map(|(episode, entry)| ActiveReport {
            episode,
            pid: entry.pid,
            alive: process::is_alive(entry.pid),
            progress: progress::episode_progress(ctx, episode),
        })
        .collect();
    StatusReport {
        completed: status.completed,
        failed: status.failed,
        cancelled: status.cancelled,
        source_url: status.source_url,
        active,
    }
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopOutcome {
    /// Fetch subprocesses confirmed gone after escalation.
    pub terminated: usize,
    /// Registered subprocesses found at the time of the request.
    pub found: usize,
    pub runner_terminated: bool,
}

/// Raise the stop flag, terminate every registered pid (graceful then
/// forceful), clear the registry, and take down the recorded runner process.
/// Safe to call with nothing active: raises the flag and does nothing else.
pub fn stop_all(ctx: &ShowContext, grace: Duration) -> Result<StopOutcome> {
    stop::raise_flag(ctx)?;

    let jobs = ActiveJobs::snapshot(ctx);
    let mut outcome = StopOutcome { found: jobs.len(), ..Default::default() };
    for (episode, entry) in jobs.iter() {
        if process::terminate(entry.pid, grace) {
            tracing::info!("stopped episode {} (pid {})", episode, entry.pid);
            outcome.terminated += 1;
        } else {
            tracing::warn!("pid {} for episode {} did not confirm exit", entry.pid, episode);
        }
    }
    ActiveJobs::clear(ctx)?;

    if let Some(pid) = daemon::recorded_pid(ctx) {
        outcome.runner_terminated = process::terminate(pid, grace);
        daemon::clear_pid(ctx)?;
        tracing::info!("stopped runner (pid {})", pid);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Outcome;
    use crate::store::ActiveEntry;
    use tempfile::tempdir;

    #[test]
    fn stop_with_nothing_active_is_a_noop_plus_flag() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let outcome = stop_all(&ctx, Duration::from_millis(100)).unwrap();
        assert_eq!(outcome, StopOutcome { terminated: 0, found: 0, runner_terminated: false });
        assert!(stop::is_raised(&ctx));
        assert!(!ctx.active_path().exists());
        assert!(!ctx.status_path().exists());
        assert!(!ctx.cache_path().exists());
    }

    #[test]
    fn snapshot_reflects_stores_and_liveness() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());

        let mut status = StatusRecord::default();
        status.record(1, Outcome::Completed);
        status.record(2, Outcome::Failed);
        status.save(&ctx, Some("https://example.com/show")).unwrap();

        // Our own pid is definitely alive; a pid far above pid_max is
        // definitely not.
        ActiveJobs::register(&ctx, 3, ActiveEntry::new(std::process::id(), "loc3")).unwrap();
        ActiveJobs::register(&ctx, 4, ActiveEntry::new(999_999_999, "loc4")).unwrap();
        std::fs::write(ctx.progress_log_path(3), "[download]  40.0% of x\n").unwrap();

        let report = snapshot(&ctx);
        assert!(report.completed.contains(&1));
        assert!(report.failed.contains(&2));
        assert_eq!(report.source_url.as_deref(), Some("https://example.com/show"));
        assert_eq!(report.active.len(), 2);
        let ep3 = report.active.iter().find(|a| a.episode == 3).unwrap();
        assert!(ep3.alive);
        assert_eq!(ep3.progress, Some(40.0));
        let ep4 = report.active.iter().find(|a| a.episode == 4).unwrap();
        assert!(!ep4.alive);
        assert_eq!(ep4.progress, None);
    }

    #[cfg(unix)]
    #[test]
    fn stop_terminates_registered_processes_and_clears_registry() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        ActiveJobs::register(&ctx, 1, ActiveEntry::new(child.id(), "loc1")).unwrap();

        let outcome = stop_all(&ctx, Duration::from_millis(200)).unwrap();
        assert_eq!(outcome.found, 1);
        assert!(stop::is_raised(&ctx));
        assert!(ActiveJobs::snapshot(&ctx).is_empty());
        assert!(!ctx.active_path().exists());

        // The child got SIGTERM (or SIGKILL); reap and confirm it is gone.
        let status = child.wait().unwrap();
        assert!(!status.success());
        assert!(!process::is_alive(child.id()));
    }
}
