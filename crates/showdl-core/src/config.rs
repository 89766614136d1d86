use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// External fetch tool invocation (optional `[fetcher]` section).
///
/// `args` is a template: `{locator}` expands to the resolved stream locator
/// and `{output}` to the per-episode output path template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            args: vec![
                "--newline".to_string(),
                "--progress".to_string(),
                "--no-warnings".to_string(),
                "-o".to_string(),
                "{output}".to_string(),
                "--merge-output-format".to_string(),
                "mp4".to_string(),
                "{locator}".to_string(),
            ],
        }
    }
}

/// External locator resolver invocation (`[resolver]` section).
///
/// The program receives the episode page URL as its final argument and must
/// print the stream locator on stdout; empty output or a non-zero exit means
/// the page is unresolvable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Global configuration loaded from `~/.config/showdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowdlConfig {
    /// Seconds between liveness polls of the running fetch subprocess.
    pub poll_interval_secs: u64,
    /// Seconds a subprocess gets to exit after SIGTERM before SIGKILL.
    pub grace_period_secs: u64,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    /// Optional resolver command; `showdl download` requires it.
    #[serde(default)]
    pub resolver: Option<ResolverConfig>,
}

impl Default for ShowdlConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            grace_period_secs: 5,
            fetcher: FetcherConfig::default(),
            resolver: None,
        }
    }
}

impl ShowdlConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("showdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ShowdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ShowdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ShowdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
