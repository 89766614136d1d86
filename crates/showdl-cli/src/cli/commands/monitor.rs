//! `showdl monitor <dir>` – status snapshot, or `--stop` to halt a run.

use anyhow::{bail, Result};
use std::path::Path;

use showdl_core::config::ShowdlConfig;
use showdl_core::context::ShowContext;
use showdl_core::monitor;

pub fn run_monitor(cfg: &ShowdlConfig, output_dir: &Path, stop: bool) -> Result<()> {
    if !output_dir.is_dir() {
        bail!("directory {} does not exist", output_dir.display());
    }
    let ctx = ShowContext::new(output_dir);

    if stop {
        let outcome = monitor::stop_all(&ctx, cfg.grace_period())?;
        if outcome.found == 0 {
            println!("No active downloads to stop.");
        } else {
            println!("Stopped {}/{} download process(es).", outcome.terminated, outcome.found);
        }
        if outcome.runner_terminated {
            println!("Stopped runner process.");
        }
        return Ok(());
    }

    let report = monitor::snapshot(&ctx);
    println!("Show directory: {}", output_dir.display());
    if let Some(url) = &report.source_url {
        println!("Source: {url}");
    }

    print_set("Completed", &report.completed);
    print_set("Failed", &report.failed);
    print_set("Cancelled", &report.cancelled);

    println!("\nActive:");
    if report.active.is_empty() {
        println!("  none");
    } else {
        println!("  {:<8} {:<8} {:<9} {}", "EPISODE", "PID", "STATE", "PROGRESS");
        for job in &report.active {
            let state = if job.alive { "running" } else { "stopped" };
            let progress = job
                .progress
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<8} {:<8} {:<9} {}", job.episode, job.pid, state, progress);
        }
    }
    Ok(())
}

fn print_set(label: &str, episodes: &std::collections::BTreeSet<u32>) {
    let list = if episodes.is_empty() {
        "none".to_string()
    } else {
        episodes.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
    };
    println!("{label}: {list}");
}
