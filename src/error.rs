// Error types for gitstats.
// Covers GitHub API failures, store failures, and configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitStatsError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Not a repository reference: {0:?}")]
    InvalidRepo(String),

    #[error("Invalid configuration value for {name}: {value:?}")]
    InvalidConfig { name: &'static str, value: String },

    #[error("Cache store unavailable: {0}")]
    Store(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GitStatsError>;
