//! Job runner: the supervisor loop behind a detached orchestration run.
//!
//! Episodes are processed strictly in caller order, one fetch subprocess at a
//! time. Per episode: spawn the fetch tool with its output redirected to the
//! progress log, write the active-registry entry before the first poll (a
//! crash between launch and poll still leaves a discoverable record), then
//! poll `try_wait` at a fixed interval, re-checking the stop flag on each
//! wake. Leaving RUNNING removes the registry entry and appends the outcome
//! to the status document as one logical transition.

use anyhow::{Context as _, Result};
use std::fs::File;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::{FetcherConfig, ShowdlConfig};
use crate::context::ShowContext;
use crate::job::{Outcome, ResolvedJob};
use crate::stop;
use crate::store::{ActiveEntry, ActiveJobs, StatusRecord};

/// Templated invocation of the external fetch tool.
#[derive(Debug, Clone)]
pub struct FetchCommand {
    program: String,
    args: Vec<String>,
}

impl FetchCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(cfg: &FetcherConfig) -> Self {
        Self::new(cfg.program.clone(), cfg.args.clone())
    }

    /// Expand `{locator}` / `{output}` placeholders into a runnable command.
    fn build(&self, locator: &str, output: &Path) -> Command {
        let output = output.to_string_lossy();
        let mut cmd = Command::new(&self.program);
        for arg in &self.args {
            cmd.arg(arg.replace("{locator}", locator).replace("{output}", &output));
        }
        cmd
    }
}

/// Counts reported after a run; `stopped` is set when the stop flag ended the
/// run early and the remaining episodes were never launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub skipped: usize,
    pub stopped: bool,
}

/// Supervisor for one orchestration run over a prepared job list.
pub struct JobRunner {
    ctx: ShowContext,
    fetch: FetchCommand,
    title: String,
    origin_url: Option<String>,
    poll_interval: Duration,
    grace_period: Duration,
}

impl JobRunner {
    pub fn new(ctx: ShowContext, cfg: &ShowdlConfig, title: impl Into<String>) -> Self {
        Self {
            ctx,
            fetch: FetchCommand::from_config(&cfg.fetcher),
            title: title.into(),
            origin_url: None,
            poll_interval: cfg.poll_interval(),
            grace_period: cfg.grace_period(),
        }
    }

    pub fn origin_url(mut self, url: Option<String>) -> Self {
        self.origin_url = url;
        self
    }

    pub fn fetch_command(mut self, fetch: FetchCommand) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Run the supervisor loop over `jobs`, in order, one subprocess at a time.
    ///
    /// The loop never clears the stop flag; a flag raised before the first
    /// boundary check means zero launches.
    pub fn run(&self, jobs: &[ResolvedJob]) -> Result<RunSummary> {
        let mut status = StatusRecord::load(&self.ctx);
        let mut summary = RunSummary::default();

        for (idx, job) in jobs.iter().enumerate() {
            if stop::is_raised(&self.ctx) {
                summary.stopped = true;
                summary.skipped = jobs.len() - idx;
                tracing::info!(
                    "stop requested, skipping {} remaining episode(s)",
                    summary.skipped
                );
                break;
            }

            let outcome = self.run_one(job)?;
            match outcome {
                Outcome::Completed => summary.completed += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Cancelled => summary.cancelled += 1,
            }

            // Unregister + status append form one logical transition out of RUNNING.
            ActiveJobs::unregister(&self.ctx, job.number)?;
            status.record(job.number, outcome);
            status.save(&self.ctx, self.origin_url.as_deref())?;
            tracing::info!("episode {} {}", job.number, outcome.as_str());
        }

        Ok(summary)
    }

    /// Launch and supervise one fetch subprocess; returns its terminal outcome.
    /// The registry entry is written here and removed by the caller.
    fn run_one(&self, job: &ResolvedJob) -> Result<Outcome> {
        let log_path = self.ctx.progress_log_path(job.number);
        let output_template = self
            .ctx
            .output_dir()
            .join(format!("{}_E{}.%(ext)s", self.title, job.number));

        let mut child = match self.spawn_fetch(&job.locator, &output_template, &log_path) {
            Ok(child) => child,
            Err(err) => {
                // Launch failure goes straight to FAILED; the episode never
                // reached LAUNCHED, so no registry entry exists to remove.
                tracing::warn!("episode {} failed to launch: {}", job.number, err);
                return Ok(Outcome::Failed);
            }
        };

        ActiveJobs::register(
            &self.ctx,
            job.number,
            ActiveEntry::new(child.id(), job.locator.clone()),
        )?;
        tracing::info!(
            "episode {} launched (pid {}), progress: tail -f {}",
            job.number,
            child.id(),
            log_path.display()
        );

        loop {
            match child.try_wait() {
                Ok(Some(exit)) => {
                    return Ok(if exit.success() { Outcome::Completed } else { Outcome::Failed });
                }
                Ok(None) => {
                    if stop::is_raised(&self.ctx) {
                        tracing::info!("stop requested, terminating episode {}", job.number);
                        self.terminate_child(&mut child);
                        return Ok(Outcome::Cancelled);
                    }
                    std::thread::sleep(self.poll_interval);
                }
                Err(err) => {
                    tracing::warn!("episode {} wait error: {}", job.number, err);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(Outcome::Failed);
                }
            }
        }
    }

    fn spawn_fetch(&self, locator: &str, output: &Path, log_path: &Path) -> Result<Child> {
        let log = File::create(log_path)
            .with_context(|| format!("create progress log {}", log_path.display()))?;
        let child = self
            .fetch
            .build(locator, output)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log))
            .spawn()
            .with_context(|| format!("spawn fetch tool `{}`", self.fetch.program))?;
        Ok(child)
    }

    /// Graceful-then-forceful termination of our own child: SIGTERM, poll
    /// `try_wait` for the grace period (reaping on exit), then SIGKILL.
    fn terminate_child(&self, child: &mut Child) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
            let deadline = Instant::now() + self.grace_period;
            while Instant::now() < deadline {
                match child.try_wait() {
                    Ok(Some(_)) => return,
                    Ok(None) => std::thread::sleep(Duration::from_millis(100)),
                    Err(_) => break,
                }
            }
        }
        let _ = child.kill();
        let _ = child.wait();
    }
}
