use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{GitStatsError, Result};

pub const DEFAULT_CACHE_TTL_LOWER: u64 = 1440;
pub const DEFAULT_CACHE_TTL_UPPER: u64 = 10080;
pub const DEFAULT_MAX_REFRESHES: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str = "gitstats";

/// Longest backoff applied after a failed refresh, in minutes.
const MAX_DEFAULT_RETRY_DELAY: u64 = 60;

/// Cache and client settings.
///
/// TTLs and delays are in minutes. A `cache_ttl_upper` of zero disables
/// caching: every lookup goes straight to the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Age after which an entry becomes eligible for refresh.
    #[serde(default = "default_cache_ttl_lower")]
    pub cache_ttl_lower: u64,
    /// Age after which an entry must be refreshed and leaves the store.
    #[serde(default = "default_cache_ttl_upper")]
    pub cache_ttl_upper: u64,
    /// Backoff after a failed refresh. Derived from the lower TTL when unset.
    #[serde(default)]
    pub retry_delay: Option<u64>,
    /// Refreshes of merely stale entries allowed per session.
    #[serde(default = "default_max_refreshes")]
    pub max_refreshes_per_invocation: u32,
    /// Directory for the file store. Platform cache dir when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_ttl_lower() -> u64 {
    DEFAULT_CACHE_TTL_LOWER
}

fn default_cache_ttl_upper() -> u64 {
    DEFAULT_CACHE_TTL_UPPER
}

fn default_max_refreshes() -> u32 {
    DEFAULT_MAX_REFRESHES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl_lower: DEFAULT_CACHE_TTL_LOWER,
            cache_ttl_upper: DEFAULT_CACHE_TTL_UPPER,
            retry_delay: None,
            max_refreshes_per_invocation: DEFAULT_MAX_REFRESHES,
            cache_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load settings from `GITSTATS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "GITSTATS_CACHE_TTL_LOWER")? {
            config.cache_ttl_lower = v;
        }
        if let Some(v) = parse_var(&lookup, "GITSTATS_CACHE_TTL_UPPER")? {
            config.cache_ttl_upper = v;
        }
        if let Some(v) = parse_var(&lookup, "GITSTATS_RETRY_DELAY")? {
            config.retry_delay = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "GITSTATS_MAX_REFRESHES")? {
            config.max_refreshes_per_invocation = v;
        }
        if let Some(v) = parse_var(&lookup, "GITSTATS_TIMEOUT_SECS")? {
            config.timeout_secs = v;
        }
        if let Some(dir) = lookup("GITSTATS_CACHE_DIR").filter(|v| !v.trim().is_empty()) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(agent) = lookup("GITSTATS_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }

        Ok(config.normalized())
    }

    /// Raise a non-zero upper TTL to at least the lower TTL.
    pub fn normalized(mut self) -> Self {
        if self.cache_ttl_upper != 0 {
            self.cache_ttl_upper = self.cache_ttl_upper.max(self.cache_ttl_lower);
        }
        self
    }

    /// Whether entries are stored at all.
    pub fn caching_enabled(&self) -> bool {
        self.cache_ttl_upper != 0
    }

    /// Effective backoff in minutes, never below one.
    pub fn retry_delay(&self) -> u64 {
        let delay = self.retry_delay.unwrap_or_else(|| {
            let base = if self.cache_ttl_lower > 0 {
                self.cache_ttl_lower
            } else {
                DEFAULT_CACHE_TTL_LOWER
            };
            base.min(MAX_DEFAULT_RETRY_DELAY)
        });
        delay.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GitStatsError::InvalidConfig { name, value }),
        _ => Ok(None),
    }
}
