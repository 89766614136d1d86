//! Episode job types shared by resolver, runner, and stores.

use serde::{Deserialize, Serialize};

/// One episode as supplied by the caller: number plus its source page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    pub url: String,
}

/// An episode whose stream locator has been resolved and is ready to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedJob {
    pub number: u32,
    pub locator: String,
}

/// Terminal outcome of a supervised fetch subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }
}
