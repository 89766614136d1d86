pub mod config;
pub mod logging;

pub mod context;
pub mod daemon;
pub mod job;
pub mod monitor;
pub mod process;
pub mod progress;
pub mod resolver;
pub mod runner;
pub mod stop;
pub mod store;
