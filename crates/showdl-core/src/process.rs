//! Pid-level liveness and termination helpers.
//!
//! Liveness is a signal-0 probe against the recorded pid. The OS can reuse a
//! pid after the original process exits, so a "alive" reading for a stale
//! entry can be wrong; the design accepts this as a documented limitation
//! rather than guessing at intent.

use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Whether `pid` currently refers to a live process.
#[cfg(unix)]
pub fn is_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
pub fn is_alive(_pid: u32) -> bool {
    false
}

/// Graceful-then-forceful termination: SIGTERM, wait up to `grace`, SIGKILL.
/// Returns true if the process is gone afterwards (or was already gone).
#[cfg(unix)]
pub fn terminate(pid: u32, grace: Duration) -> bool {
    let target = Pid::from_raw(pid as i32);
    if kill(target, Signal::SIGTERM).is_err() {
        // Already gone (or not ours to signal).
        return !is_alive(pid);
    }
    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if !is_alive(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    let _ = kill(target, Signal::SIGKILL);
    std::thread::sleep(Duration::from_millis(100));
    !is_alive(pid)
}

#[cfg(not(unix))]
pub fn terminate(_pid: u32, _grace: Duration) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn is_alive_tracks_child_lifetime() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        assert!(is_alive(pid));
        child.kill().unwrap();
        child.wait().unwrap();
        assert!(!is_alive(pid));
    }

    #[test]
    fn terminate_stops_a_live_process_within_grace() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        // Reap in the background so the signal-0 probe sees the pid disappear
        // (an unreaped zombie still answers signal 0).
        let reaper = std::thread::spawn(move || {
            let _ = child.wait();
        });
        assert!(terminate(pid, Duration::from_secs(5)));
        reaper.join().unwrap();
        assert!(!is_alive(pid));
    }

    #[test]
    fn terminate_on_dead_pid_reports_gone() {
        let mut child = Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(terminate(pid, Duration::from_millis(100)));
    }
}
