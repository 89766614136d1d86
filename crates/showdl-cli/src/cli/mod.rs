//! CLI for the showdl download orchestrator.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use showdl_core::config;

use commands::{run_download, run_loop, run_monitor};

/// Top-level CLI for the showdl download orchestrator.
#[derive(Debug, Parser)]
#[command(name = "showdl")]
#[command(about = "showdl: background download orchestrator for episodic video", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a show manifest and start a detached background run.
    Download {
        /// Show manifest (TOML: title, source_url, [[episodes]] number/url).
        manifest: PathBuf,

        /// Output directory for the show (default: ./<title>).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Run the loop in this process instead of detaching.
        #[arg(long)]
        foreground: bool,
    },

    /// Print a status snapshot for a show directory.
    Monitor {
        /// Show output directory.
        output_dir: PathBuf,

        /// Raise the stop signal and terminate tracked processes.
        #[arg(long)]
        stop: bool,
    },

    /// Execute the runner loop over a prepared queue (used by the daemonizer).
    #[command(hide = true)]
    RunLoop {
        /// Show output directory.
        output_dir: PathBuf,
    },
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    match cli.command {
        CliCommand::Download { manifest, output_dir, foreground } => {
            run_download(&cfg, &manifest, output_dir, foreground)
        }
        CliCommand::Monitor { output_dir, stop } => run_monitor(&cfg, &output_dir, stop),
        CliCommand::RunLoop { output_dir } => run_loop(&cfg, &output_dir),
    }
}
