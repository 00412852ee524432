// Staleness-aware read-through cache for repository statistics.
// Serves cached data when it can, refreshes when it should, and backs off
// from the provider after failures.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::github::RepoStats;
use crate::repo::{Provider, RepoRef};

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, ProviderDownMarker, entry_key, provider_down_key};
use super::fetcher::Fetcher;
use super::policy::{Decision, Observation, RefreshPolicy};
use super::store::{self, Store};

/// Read-through cache in front of a [`Fetcher`].
///
/// Shared freely between tasks. Refresh limits apply per [`Session`];
/// [`StatsCache::fetch`] runs each call in a session of its own.
pub struct StatsCache {
    config: Config,
    policy: RefreshPolicy,
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
}

impl StatsCache {
    pub fn new(config: Config, store: Arc<dyn Store>, fetcher: Arc<dyn Fetcher>) -> Self {
        let config = config.normalized();
        Self {
            policy: RefreshPolicy::from(&config),
            config,
            store,
            fetcher,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a resolution pass with its own refresh counter.
    pub fn session(&self) -> Session<'_> {
        Session {
            cache: self,
            refreshes: 0,
        }
    }

    /// Resolve `input` to statistics in a fresh session.
    ///
    /// `Ok(None)` means the input is not a repository reference or nothing
    /// could be obtained. Errors come only from the store.
    pub async fn fetch(&self, input: &str) -> Result<Option<RepoStats>> {
        self.session().fetch(input).await
    }

    /// Cached entry for `input`, without refreshing.
    pub fn peek(&self, input: &str) -> Result<Option<CacheEntry>> {
        match RepoRef::parse(input) {
            Some(repo) if self.config.caching_enabled() => {
                store::read(self.store.as_ref(), &entry_key(&repo))
            }
            _ => Ok(None),
        }
    }

    /// Drop the cached entry for `input`. Returns false if the input does not parse.
    pub fn invalidate(&self, input: &str) -> Result<bool> {
        let Some(repo) = RepoRef::parse(input) else {
            return Ok(false);
        };
        self.store.remove(&entry_key(&repo))?;
        info!(key = repo.key(), "invalidated cached stats");
        Ok(true)
    }

    /// End of the provider's active backoff window, if any.
    pub fn provider_down_until(&self, provider: Provider) -> Result<Option<DateTime<Utc>>> {
        let now = self.clock.now();
        let marker: Option<ProviderDownMarker> =
            store::read(self.store.as_ref(), &provider_down_key(provider))?;
        Ok(marker.filter(|m| m.is_active(now)).map(|m| m.down_until))
    }

    async fn resolve(&self, repo: &RepoRef, refreshes: &mut u32) -> Result<Option<RepoStats>> {
        if !self.config.caching_enabled() {
            let stats = self.fetcher.fetch(repo).await;
            if stats.is_some() {
                *refreshes += 1;
            }
            debug!(key = repo.key(), found = stats.is_some(), "caching disabled, fetched live");
            return Ok(stats);
        }

        let now = self.clock.now();
        let key = entry_key(repo);
        let marker_key = provider_down_key(repo.provider());

        // An entry holding another repository's data counts as a miss.
        let entry: Option<CacheEntry> = store::read::<CacheEntry>(self.store.as_ref(), &key)?
            .filter(|e| e.data.as_ref().is_some_and(|d| d.key == repo.key()));
        let marker: Option<ProviderDownMarker> = store::read(self.store.as_ref(), &marker_key)?;

        let seen = Observation {
            age_minutes: entry.as_ref().map(|e| e.age_minutes(now)),
            provider_down: marker.is_some_and(|m| m.is_active(now)),
            retry_floor: entry.as_ref().is_some_and(|e| e.retry_floor_active(now)),
            refreshes_used: *refreshes,
        };
        let cached = entry.as_ref().and_then(|e| e.data.clone());

        match self.policy.decide(&seen) {
            Decision::Serve(reason) => {
                debug!(
                    key = repo.key(),
                    ?reason,
                    age_minutes = ?seen.age_minutes,
                    hit = cached.is_some(),
                    "serving from cache"
                );
                return Ok(cached);
            }
            Decision::Refresh { hard_expiry } => {
                debug!(
                    key = repo.key(),
                    hard_expiry,
                    age_minutes = ?seen.age_minutes,
                    "refreshing from provider"
                );
            }
        }

        match self.fetcher.fetch(repo).await {
            Some(stats) => {
                *refreshes += 1;
                let fresh = CacheEntry::fetched(stats.clone(), now);
                store::write(self.store.as_ref(), &key, &fresh, self.config.cache_ttl_upper)?;
                self.store.remove(&marker_key)?;
                info!(key = repo.key(), "refreshed repository stats");
                Ok(Some(stats))
            }
            None => {
                let retry_delay = self.config.retry_delay();
                let retry_at = minutes_after(now, retry_delay);

                let marker = ProviderDownMarker {
                    down_until: retry_at,
                };
                store::write(self.store.as_ref(), &marker_key, &marker, retry_delay)?;

                if let Some(entry) = &entry {
                    // Keep the original expiry; a failed attempt must not extend it.
                    let remaining = (self.config.cache_ttl_upper as f64 - entry.age_minutes(now))
                        .ceil()
                        .max(1.0) as u64;
                    store::write(
                        self.store.as_ref(),
                        &key,
                        &entry.deferred_until(retry_at),
                        remaining,
                    )?;
                }

                warn!(
                    key = repo.key(),
                    retry_delay_minutes = retry_delay,
                    serving_stale = cached.is_some(),
                    "refresh failed, backing off"
                );
                Ok(cached)
            }
        }
    }
}

/// One logical resolution pass, e.g. a single incoming request.
///
/// Refreshes of merely stale entries are capped per session; misses and
/// hard-expired entries are always attempted.
pub struct Session<'a> {
    cache: &'a StatsCache,
    refreshes: u32,
}

impl Session<'_> {
    pub async fn fetch(&mut self, input: &str) -> Result<Option<RepoStats>> {
        match RepoRef::parse(input) {
            Some(repo) => self.fetch_repo(&repo).await,
            None => {
                debug!(input, "not a repository reference");
                Ok(None)
            }
        }
    }

    pub async fn fetch_repo(&mut self, repo: &RepoRef) -> Result<Option<RepoStats>> {
        self.cache.resolve(repo, &mut self.refreshes).await
    }

    /// Successful provider fetches made so far.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}

fn minutes_after(now: DateTime<Utc>, minutes: u64) -> DateTime<Utc> {
    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
