//! `showdl run-loop <dir>` – the detached runner entry point (hidden).

use anyhow::Result;
use std::path::Path;

use showdl_core::config::ShowdlConfig;
use showdl_core::context::ShowContext;
use showdl_core::daemon;
use showdl_core::runner::JobRunner;
use showdl_core::store::DownloadQueue;

pub fn run_loop(cfg: &ShowdlConfig, output_dir: &Path) -> Result<()> {
    let ctx = ShowContext::new(output_dir);
    let queue = DownloadQueue::load(&ctx)?;
    tracing::info!(
        "runner loop starting: {} job(s) for '{}'",
        queue.jobs.len(),
        queue.title
    );

    let runner = JobRunner::new(ctx.clone(), cfg, &queue.title)
        .origin_url(queue.source_url.clone());
    let summary = runner.run(&queue.jobs)?;

    tracing::info!(
        "runner loop finished: {} completed, {} failed, {} cancelled, {} skipped",
        summary.completed,
        summary.failed,
        summary.cancelled,
        summary.skipped
    );

    DownloadQueue::remove(&ctx)?;
    daemon::clear_pid(&ctx)?;
    Ok(())
}
