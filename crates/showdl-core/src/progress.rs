//! Progress extraction from per-episode fetch logs.
//!
//! The fetch tool writes `[download]  42.3% of ...` lines to the progress
//! log; the monitor scans the tail for the most recent one. Best effort: an
//! unreadable or empty log is simply "unknown".

use std::path::Path;

use crate::context::ShowContext;

/// Lines scanned from the end of the log.
const TAIL_LINES: usize = 100;

/// Most recent download percentage for an episode, if the log reveals one.
/// `None` means the log does not exist yet; an existing log with no progress
/// lines reads as 0.0.
pub fn episode_progress(ctx: &ShowContext, episode: u32) -> Option<f64> {
    progress_from_log(&ctx.progress_log_path(episode))
}

pub fn progress_from_log(path: &Path) -> Option<f64> {
    let data = std::fs::read_to_string(path).ok()?;
    Some(latest_percent(&data))
}

/// Scan the last `TAIL_LINES` lines, newest first, for a `[download] NN%` line.
fn latest_percent(log: &str) -> f64 {
    let lines: Vec<&str> = log.lines().collect();
    let tail_start = lines.len().saturating_sub(TAIL_LINES);
    for line in lines[tail_start..].iter().rev() {
        if let Some(percent) = parse_percent_line(line) {
            return percent.clamp(0.0, 100.0);
        }
    }
    0.0
}

fn parse_percent_line(line: &str) -> Option<f64> {
    let rest = line.split("[download]").nth(1)?;
    let number = rest.split('%').next()?.trim();
    number.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_latest_download_line() {
        let log = "\
[download] Destination: ep1.mp4
[download]   1.2% of 700MiB at 2MiB/s
[download]  57.8% of 700MiB at 2MiB/s
some unrelated line
";
        assert_eq!(latest_percent(log), 57.8);
    }

    #[test]
    fn clamps_out_of_range_values() {
        assert_eq!(latest_percent("[download] 150.0% of x"), 100.0);
        assert_eq!(latest_percent("[download] -3% of x"), 0.0);
    }

    #[test]
    fn log_without_progress_lines_reads_zero() {
        assert_eq!(latest_percent("Destination: ep1.mp4\nmuxing...\n"), 0.0);
        assert_eq!(latest_percent(""), 0.0);
        assert_eq!(latest_percent("[download] no percent here"), 0.0);
    }

    #[test]
    fn missing_log_is_unknown() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        assert_eq!(episode_progress(&ctx, 1), None);
        std::fs::write(ctx.progress_log_path(1), "[download]  12.5% of x\n").unwrap();
        assert_eq!(episode_progress(&ctx, 1), Some(12.5));
    }
}
