//! Daemon launcher: detach the runner loop from the invoking shell.
//!
//! The launching process re-execs itself with the hidden `run-loop`
//! subcommand in a fresh process group with discarded stdio, records the
//! child pid, and returns. Exactly one process executes the loop: the
//! launcher never enters it.

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

use crate::context::ShowContext;

/// Spawn the detached runner for a show whose queue has been prepared.
/// Returns the runner's pid, which is also written to `download_manager.pid`.
pub fn launch(ctx: &ShowContext) -> Result<u32> {
    let exe = std::env::current_exe().context("locate current executable")?;
    let mut cmd = Command::new(exe);
    cmd.arg("run-loop")
        .arg(ctx.output_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // New process group: the shell's SIGHUP/SIGINT no longer reach the loop.
        cmd.process_group(0);
    }
    let child = cmd.spawn().context("spawn detached runner")?;
    let pid = child.id();
    std::fs::write(ctx.runner_pid_path(), format!("{pid}\n"))
        .with_context(|| format!("write {}", ctx.runner_pid_path().display()))?;
    tracing::info!("runner detached (pid {})", pid);
    Ok(pid)
}

/// Pid recorded by the last `launch`, if the pid file exists and parses.
pub fn recorded_pid(ctx: &ShowContext) -> Option<u32> {
    let data = std::fs::read_to_string(ctx.runner_pid_path()).ok()?;
    data.trim().parse().ok()
}

/// Remove the pid file (runner exit or controller stop).
pub fn clear_pid(ctx: &ShowContext) -> Result<()> {
    let path = ctx.runner_pid_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}
