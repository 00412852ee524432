// Cache path utilities.
// Maps store keys to JSON files under the platform cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/gitstats on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gitstats").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the file holding `key` inside `dir`.
///
/// Keys are hex-encoded so distinct keys always map to distinct files.
pub fn entry_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", hex::encode(key)))
}
