//! Stream-locator resolution contract and the cache-driving front end.
//!
//! Page scraping and anti-bot evasion live outside this repository; the
//! orchestrator consumes them through `LocatorResolver` only. The default
//! implementation shells out to a configured external program that prints
//! the locator for a page URL on stdout.

use anyhow::Result;
use std::process::Command;
use thiserror::Error;

use crate::context::ShowContext;
use crate::job::{Episode, ResolvedJob};
use crate::store::LocatorCache;

/// Resolver infrastructure failure (as opposed to "page was unresolvable",
/// which is the `Ok(None)` case).
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolver command failed to start: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("resolver produced undecodable output for {url}")]
    BadOutput { url: String },
}

/// External resolution contract: page URL in, stream locator out.
/// `Ok(None)` means the page could not be resolved; the episode is skipped
/// for this run and not retried automatically.
pub trait LocatorResolver {
    fn resolve(&self, page_url: &str) -> Result<Option<String>, ResolveError>;
}

/// Resolver that runs an external program with the page URL as its final
/// argument and takes trimmed stdout as the locator.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
}

impl CommandResolver {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

impl LocatorResolver for CommandResolver {
    fn resolve(&self, page_url: &str) -> Result<Option<String>, ResolveError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(page_url)
            .output()?;
        if !output.status.success() {
            tracing::warn!("resolver exited with {} for {}", output.status, page_url);
            return Ok(None);
        }
        let stdout =
            String::from_utf8(output.stdout).map_err(|_| ResolveError::BadOutput {
                url: page_url.to_string(),
            })?;
        let locator = stdout.trim();
        if locator.is_empty() {
            return Ok(None);
        }
        Ok(Some(locator.to_string()))
    }
}

/// Resolve an ordered episode list through the locator cache.
///
/// Cache hits never touch the resolver. Each fresh resolution is persisted
/// immediately so a crash mid-run keeps everything resolved so far.
/// Unresolvable episodes (and resolver failures) are logged and skipped;
/// the returned list preserves caller order.
pub fn resolve_episodes(
    ctx: &ShowContext,
    resolver: &dyn LocatorResolver,
    episodes: &[Episode],
) -> Result<Vec<ResolvedJob>> {
    let mut cache = LocatorCache::load(ctx);
    let mut resolved = Vec::with_capacity(episodes.len());

    for episode in episodes {
        if let Some(locator) = cache.get(episode.number) {
            tracing::debug!("episode {} locator cached", episode.number);
            resolved.push(ResolvedJob { number: episode.number, locator: locator.to_string() });
            continue;
        }
        match resolver.resolve(&episode.url) {
            Ok(Some(locator)) => {
                tracing::info!("episode {} resolved", episode.number);
                cache.insert(episode.number, locator.clone());
                cache.save(ctx)?;
                resolved.push(ResolvedJob { number: episode.number, locator });
            }
            Ok(None) => {
                tracing::warn!(
                    "episode {} unresolvable ({}), skipping",
                    episode.number,
                    episode.url
                );
            }
            Err(err) => {
                tracing::warn!("episode {} resolver error: {}, skipping", episode.number, err);
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct FakeResolver {
        calls: RefCell<Vec<String>>,
    }

    impl FakeResolver {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()) }
        }
    }

    impl LocatorResolver for FakeResolver {
        fn resolve(&self, page_url: &str) -> Result<Option<String>, ResolveError> {
            self.calls.borrow_mut().push(page_url.to_string());
            if page_url.contains("ep2") {
                return Ok(None);
            }
            Ok(Some(format!("{page_url}/stream.m3u8")))
        }
    }

    fn episodes() -> Vec<Episode> {
        vec![
            Episode { number: 1, url: "https://site/ep1".into() },
            Episode { number: 2, url: "https://site/ep2".into() },
            Episode { number: 3, url: "https://site/ep3".into() },
        ]
    }

    #[test]
    fn unresolvable_episodes_are_skipped_in_order() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let resolver = FakeResolver::new();
        let resolved = resolve_episodes(&ctx, &resolver, &episodes()).unwrap();
        let numbers: Vec<u32> = resolved.iter().map(|j| j.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn resolutions_are_persisted_immediately() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let resolver = FakeResolver::new();
        resolve_episodes(&ctx, &resolver, &episodes()).unwrap();
        let cache = LocatorCache::load(&ctx);
        assert_eq!(cache.get(1), Some("https://site/ep1/stream.m3u8"));
        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(3), Some("https://site/ep3/stream.m3u8"));
    }

    #[test]
    fn cached_episodes_never_reinvoke_the_resolver() {
        let dir = tempdir().unwrap();
        let ctx = ShowContext::new(dir.path());
        let first = FakeResolver::new();
        resolve_episodes(&ctx, &first, &episodes()).unwrap();
        assert_eq!(first.calls.borrow().len(), 3);

        let second = FakeResolver::new();
        let resolved = resolve_episodes(&ctx, &second, &episodes()).unwrap();
        // 1 and 3 come from the cache; only the still-unresolved 2 is retried.
        assert_eq!(second.calls.borrow().as_slice(), ["https://site/ep2"]);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn command_resolver_takes_trimmed_stdout() {
        let resolver = CommandResolver::new("sh", vec!["-c".into(), "echo '  found.m3u8 '".into(), "sh".into()]);
        let locator = resolver.resolve("https://ignored").unwrap();
        assert_eq!(locator.as_deref(), Some("found.m3u8"));
    }

    #[test]
    fn command_resolver_maps_failure_to_none() {
        let resolver = CommandResolver::new("sh", vec!["-c".into(), "exit 3".into(), "sh".into()]);
        assert_eq!(resolver.resolve("https://ignored").unwrap(), None);
        let empty = CommandResolver::new("sh", vec!["-c".into(), "true".into(), "sh".into()]);
        assert_eq!(empty.resolve("https://ignored").unwrap(), None);
    }
}
