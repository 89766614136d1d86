//! `showdl download <manifest>` – resolve locators and start a detached run.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use showdl_core::config::ShowdlConfig;
use showdl_core::context::ShowContext;
use showdl_core::daemon;
use showdl_core::job::Episode;
use showdl_core::resolver::{resolve_episodes, CommandResolver};
use showdl_core::stop;
use showdl_core::store::{DownloadQueue, StatusRecord};

/// Declarative show manifest: which episodes to fetch and where they live.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowManifest {
    pub title: String,
    #[serde(default)]
    pub source_url: Option<String>,
    pub episodes: Vec<Episode>,
}

impl ShowManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        let manifest: ShowManifest =
            toml::from_str(&data).with_context(|| format!("parse manifest {}", path.display()))?;
        if manifest.episodes.is_empty() {
            bail!("manifest {} lists no episodes", path.display());
        }
        Ok(manifest)
    }
}

pub fn run_download(
    cfg: &ShowdlConfig,
    manifest_path: &Path,
    output_dir: Option<PathBuf>,
    foreground: bool,
) -> Result<()> {
    let manifest = ShowManifest::load(manifest_path)?;
    let resolver_cfg = cfg.resolver.as_ref().ok_or_else(|| {
        anyhow::anyhow!("no resolver configured; set [resolver] program in the showdl config")
    })?;

    let ctx = ShowContext::new(output_dir.unwrap_or_else(|| PathBuf::from(&manifest.title)));
    ctx.ensure_dir()
        .with_context(|| format!("create output dir {}", ctx.output_dir().display()))?;

    // A deliberately started fresh run clears any stale stop request; the
    // detached loop itself never clears the flag.
    stop::clear(&ctx)?;

    let resolver = CommandResolver::new(&resolver_cfg.program, resolver_cfg.args.clone());
    let jobs = resolve_episodes(&ctx, &resolver, &manifest.episodes)?;
    if jobs.is_empty() {
        bail!("none of the {} episode(s) could be resolved", manifest.episodes.len());
    }
    println!("{} of {} episode(s) resolved", jobs.len(), manifest.episodes.len());

    // Record the origin URL before any outcome exists.
    StatusRecord::load(&ctx).save(&ctx, manifest.source_url.as_deref())?;

    let queue = DownloadQueue {
        title: manifest.title.clone(),
        source_url: manifest.source_url.clone(),
        jobs,
    };
    queue.save(&ctx)?;

    if foreground {
        return super::run_loop(cfg, ctx.output_dir());
    }

    let pid = daemon::launch(&ctx)?;
    println!("downloads running in background (pid {pid})");
    println!("check progress with: showdl monitor {}", ctx.output_dir().display());
    Ok(())
}
