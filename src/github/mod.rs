// GitHub API module.
// Provides the client, payload types, and the normalized stats record.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use types::*;
