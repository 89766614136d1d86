//! Stop signal: a durable marker file requesting cooperative shutdown.
//!
//! Raised by the controller (`showdl monitor --stop`); checked by the runner
//! before each launch and on every poll wake. Cleared only by the front-end
//! when a fresh orchestration run is deliberately started, so a stale flag
//! from a previous stop does not block a restart. The detached loop itself
//! never clears the flag.

use anyhow::Result;

use crate::context::ShowContext;

/// Raise the stop signal for a show. Idempotent.
pub fn raise_flag(ctx: &ShowContext) -> Result<()> {
    std::fs::write(ctx.stop_flag_path(), "1")?;
    Ok(())
}

/// Clear a stale stop signal at the start of a fresh run. Idempotent.
pub fn clear(ctx: &ShowContext) -> Result<()> {
    let path = ctx.stop_flag_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

/// Whether a stop has been requested.
pub fn is_raised(ctx: &ShowContext) -> bool {
    ctx.stop_flag_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn raise_check_clear() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        assert!(!is_raised(&ctx));
        raise_flag(&ctx).unwrap();
        assert!(is_raised(&ctx));
        raise_flag(&ctx).unwrap();
        assert!(is_raised(&ctx));
        clear(&ctx).unwrap();
        assert!(!is_raised(&ctx));
        clear(&ctx).unwrap();
    }
}
