// Persisted cache structures.
// A per-repository entry and the provider-wide backoff marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::RepoStats;
use crate::repo::{Provider, RepoRef};

const ENTRY_KEY_PREFIX: &str = "repo.";

/// Store key for a repository's entry.
pub fn entry_key(repo: &RepoRef) -> String {
    format!("{}{}", ENTRY_KEY_PREFIX, repo.key())
}

/// Store key for a provider's backoff marker.
pub fn provider_down_key(provider: Provider) -> String {
    format!("provider.{}.down", provider)
}

/// Last known statistics for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub data: Option<RepoStats>,
    /// Earliest time another refresh may be attempted, set after a failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_refresh_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Entry for freshly fetched data.
    pub fn fetched(data: RepoStats, now: DateTime<Utc>) -> Self {
        Self {
            fetched_at: now,
            data: Some(data),
            next_refresh_at: None,
        }
    }

    /// Age of the data in minutes. Never negative.
    pub fn age_minutes(&self, now: DateTime<Utc>) -> f64 {
        let millis = now.signed_duration_since(self.fetched_at).num_milliseconds();
        (millis as f64 / 60_000.0).max(0.0)
    }

    pub fn retry_floor_active(&self, now: DateTime<Utc>) -> bool {
        self.next_refresh_at.is_some_and(|at| at > now)
    }

    /// Same data and fetch time, with a retry floor.
    pub fn deferred_until(&self, next_refresh_at: DateTime<Utc>) -> Self {
        Self {
            next_refresh_at: Some(next_refresh_at),
            ..self.clone()
        }
    }
}

/// Shared flag telling every lookup to leave the provider alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDownMarker {
    pub down_until: DateTime<Utc>,
}

impl ProviderDownMarker {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.down_until > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepositoryPayload;
    use chrono::Duration;

    fn stats() -> RepoStats {
        let repo = RepoRef::parse("a/b").unwrap();
        RepoStats::from_payload(&repo, RepositoryPayload::default())
    }

    #[test]
    fn test_keys() {
        let repo = RepoRef::parse("Owner/Name.git").unwrap();
        assert_eq!(entry_key(&repo), "repo.owner/name");
        assert_eq!(provider_down_key(Provider::GitHub), "provider.github.down");
    }

    #[test]
    fn test_age_minutes() {
        let now = Utc::now();
        let entry = CacheEntry::fetched(stats(), now - Duration::seconds(90));
        assert!((entry.age_minutes(now) - 1.5).abs() < 1e-9);

        let future = CacheEntry::fetched(stats(), now + Duration::minutes(5));
        assert_eq!(future.age_minutes(now), 0.0);
    }

    #[test]
    fn test_deferred_keeps_data_and_fetch_time() {
        let now = Utc::now();
        let entry = CacheEntry::fetched(stats(), now - Duration::days(2));
        let deferred = entry.deferred_until(now + Duration::minutes(60));

        assert_eq!(deferred.fetched_at, entry.fetched_at);
        assert_eq!(deferred.data, entry.data);
        assert!(deferred.retry_floor_active(now));
        assert!(!deferred.retry_floor_active(now + Duration::minutes(60)));
    }

    #[test]
    fn test_entry_without_retry_floor_omits_field() {
        let entry = CacheEntry::fetched(stats(), Utc::now());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("next_refresh_at").is_none());
        assert!(json.get("fetched_at").is_some());
    }

    #[test]
    fn test_marker_activity() {
        let now = Utc::now();
        let marker = ProviderDownMarker {
            down_until: now + Duration::minutes(1),
        };
        assert!(marker.is_active(now));
        assert!(!marker.is_active(now + Duration::minutes(1)));
    }
}
