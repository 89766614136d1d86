mod download;
mod monitor;
mod run_loop;

pub use download::run_download;
pub use monitor::run_monitor;
pub use run_loop::run_loop;
