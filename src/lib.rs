// gitstats: read-through cache for GitHub repository statistics.
// Parses repository references, serves cached stats, and refreshes them from
// the GitHub REST API with backoff when the provider misbehaves.

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod repo;

pub use cache::{FileStore, MemoryStore, Session, StatsCache, Store};
pub use config::Config;
pub use error::{GitStatsError, Result};
pub use github::{GitHubClient, RepoStats};
pub use repo::{Provider, RepoRef};
