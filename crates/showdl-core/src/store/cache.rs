//! Locator cache: episode id → previously resolved stream locator.
//!
//! Resolution goes through anti-bot-protected pages and is the slowest,
//! flakiest step of a run, so every successful resolution is persisted
//! immediately. Presence of a key is the sole signal that resolution is
//! unnecessary; the orchestrator never overwrites or deletes a key.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::ShowContext;

/// Full cache document for one show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorCache {
    entries: BTreeMap<String, String>,
}

impl LocatorCache {
    /// Load the cache for a show; missing or corrupt documents load as empty.
    pub fn load(ctx: &ShowContext) -> Self {
        super::load_or_default(&ctx.cache_path())
    }

    /// Persist the whole cache document.
    pub fn save(&self, ctx: &ShowContext) -> Result<()> {
        super::save(&ctx.cache_path(), self)
    }

    pub fn get(&self, episode: u32) -> Option<&str> {
        self.entries.get(&episode.to_string()).map(String::as_str)
    }

    /// Record a fresh resolution. Existing keys are left untouched.
    pub fn insert(&mut self, episode: u32, locator: impl Into<String>) {
        self.entries.entry(episode.to_string()).or_insert_with(|| locator.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let mut cache = LocatorCache::default();
        cache.insert(1, "https://cdn.example/ep1.m3u8");
        cache.insert(3, "https://cdn.example/ep3.m3u8");
        cache.save(&ctx).unwrap();

        let loaded = LocatorCache::load(&ctx);
        assert_eq!(loaded, cache);
        assert_eq!(loaded.get(1), Some("https://cdn.example/ep1.m3u8"));
        assert_eq!(loaded.get(2), None);
    }

    #[test]
    fn insert_never_overwrites_existing_key() {
        let mut cache = LocatorCache::default();
        cache.insert(5, "first");
        cache.insert(5, "second");
        assert_eq!(cache.get(5), Some("first"));
    }

    #[test]
    fn corrupt_cache_loads_empty() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        std::fs::write(ctx.cache_path(), "]]]").unwrap();
        assert!(LocatorCache::load(&ctx).is_empty());
    }
}
