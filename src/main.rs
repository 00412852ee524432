// gitstats command line entry point.
// Resolves each argument through the file-backed cache and prints JSON.

mod cli;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gitstats::{Config, FileStore, GitHubClient, Result, StatsCache};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = std::env::args().skip(1).collect();
    let mut out = io::stdout();
    let mut err = io::stderr();
    match cli::run(args, build_cache, &mut out, &mut err).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            error!(error = %e, "gitstats failed");
            ExitCode::FAILURE
        }
    }
}

/// File-backed cache in front of the GitHub API, configured from the environment.
fn build_cache() -> Result<StatsCache> {
    let config = Config::from_env()?;
    let store = match &config.cache_dir {
        Some(dir) => FileStore::new(dir.clone()),
        None => FileStore::in_cache_dir()?,
    };
    let client = GitHubClient::from_config(&config)?;
    Ok(StatsCache::new(config, Arc::new(store), Arc::new(client)))
}
