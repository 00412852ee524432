// GitHub API endpoint functions.
// Fetches repository metadata and exposes the client as a cache fetcher.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::Fetcher;
use crate::error::Result;
use crate::repo::RepoRef;

use super::client::GitHubClient;
use super::types::{RepoStats, RepositoryPayload};

impl GitHubClient {
    /// Get a specific repository.
    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<RepositoryPayload> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: RepositoryPayload = response.json().await?;
        Ok(repository)
    }

    /// Get normalized statistics for a repository.
    pub async fn get_repo_stats(&self, repo: &RepoRef) -> Result<RepoStats> {
        let payload = self.get_repo(repo.owner(), repo.name()).await?;
        Ok(RepoStats::from_payload(repo, payload))
    }
}

#[async_trait]
impl Fetcher for GitHubClient {
    async fn fetch(&self, repo: &RepoRef) -> Option<RepoStats> {
        match self.get_repo_stats(repo).await {
            Ok(stats) => {
                debug!(key = repo.key(), "fetched repository from github");
                Some(stats)
            }
            Err(e) => {
                warn!(key = repo.key(), error = %e, "github fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::GitStatsError;

    async fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new("gitstats-test", Duration::from_secs(2))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_fetch_maps_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/phatblat/jolt"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("user-agent", "gitstats-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-remaining", "59")
                    .insert_header("x-ratelimit-limit", "60")
                    .set_body_json(serde_json::json!({
                        "name": "jolt",
                        "full_name": "phatblat/jolt",
                        "stargazers_count": 12,
                        "subscribers_count": 2,
                        "pushed_at": "2025-03-01T10:00:00Z"
                    })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let repo = RepoRef::parse("PhatBlat/Jolt").unwrap();
        let stats = client.fetch(&repo).await.unwrap();

        assert_eq!(stats.key, "phatblat/jolt");
        assert_eq!(stats.stars, Some(12));
        assert_eq!(stats.watchers, Some(2));
        assert_eq!(client.rate_limit().remaining, 59);
        assert_eq!(client.rate_limit().limit, 60);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/ghost/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let repo = RepoRef::parse("ghost/missing").unwrap();
        assert!(client.fetch(&repo).await.is_none());

        let err = client.get_repo("ghost", "missing").await.unwrap_err();
        assert!(matches!(err, GitStatsError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rate_limited_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/busy/repo"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get_repo("busy", "repo").await.unwrap_err();
        assert!(matches!(err, GitStatsError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/odd/body"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let repo = RepoRef::parse("odd/body").unwrap();
        assert!(client.fetch(&repo).await.is_none());
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/slow/repo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "name": "repo" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = GitHubClient::new("gitstats-test", Duration::from_millis(100))
            .unwrap()
            .with_base_url(server.uri());
        let repo = RepoRef::parse("slow/repo").unwrap();
        assert!(client.fetch(&repo).await.is_none());
    }
}
