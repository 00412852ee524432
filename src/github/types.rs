// GitHub API response types.
// Raw repository payload plus the normalized stats record served to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repo::{Provider, RepoRef};

/// Repository payload from `GET /repos/{owner}/{repo}`.
///
/// Every field is optional; the normalized record fills gaps from the
/// requested reference where it can.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryPayload {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
    pub homepage: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub subscribers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Normalized repository statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub provider: Provider,
    pub key: String,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub homepage: Option<String>,
    pub stars: Option<u64>,
    pub forks: Option<u64>,
    pub watchers: Option<u64>,
    pub open_issues: Option<u64>,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RepoStats {
    /// Map a provider payload onto the normalized record.
    pub fn from_payload(repo: &RepoRef, payload: RepositoryPayload) -> Self {
        Self {
            provider: repo.provider(),
            key: repo.key().to_string(),
            owner: repo.owner().to_string(),
            name: payload.name.unwrap_or_else(|| repo.name().to_string()),
            full_name: payload.full_name.unwrap_or_else(|| repo.key().to_string()),
            description: payload.description,
            url: payload.html_url,
            homepage: payload.homepage,
            stars: payload.stargazers_count,
            forks: payload.forks_count,
            // subscribers_count is the real watcher count; watchers_count mirrors stars.
            watchers: payload.subscribers_count.or(payload.watchers_count),
            open_issues: payload.open_issues_count,
            default_branch: payload.default_branch,
            language: payload.language,
            updated_at: payload.pushed_at.or(payload.updated_at),
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
