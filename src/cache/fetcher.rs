use async_trait::async_trait;

use crate::github::RepoStats;
use crate::repo::RepoRef;

/// One bounded attempt to load a repository from the provider.
///
/// Implementations return `None` on any failure, timeouts included.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, repo: &RepoRef) -> Option<RepoStats>;
}
