// Filesystem-backed store.
// One JSON file per key, written atomically. Expired or unreadable files read
// as missing and are replaced by the next write.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{GitStatsError, Result};

use super::clock::{Clock, SystemClock};
use super::paths;
use super::store::{Store, StoredItem};

/// Distinguishes temp files of concurrent writers.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Store keeping each key in `<dir>/<key>.json`.
pub struct FileStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Store in the platform cache directory.
    pub fn in_cache_dir() -> Result<Self> {
        paths::cache_dir()
            .map(Self::new)
            .ok_or_else(|| GitStatsError::Store("no cache directory available".to_string()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Delete every stored entry.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn read_item(&self, path: &Path) -> Result<Option<StoredItem>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(item) => Ok(Some(item)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                Ok(None)
            }
        }
    }

    fn write_file(temp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(temp_path, path)
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = paths::entry_path(&self.dir, key);
        let Some(item) = self.read_item(&path)? else {
            return Ok(None);
        };

        // Left in place; removing here could delete a concurrent fresh write.
        if item.is_expired(self.clock.now()) {
            debug!(key, "cache file expired");
            return Ok(None);
        }
        Ok(Some(item.value))
    }

    fn set(&self, key: &str, value: Value, ttl_minutes: u64) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = paths::entry_path(&self.dir, key);
        let item = StoredItem::new(value, self.clock.now(), ttl_minutes);
        let json = serde_json::to_string_pretty(&item)?;

        // Write atomically via temp file
        let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
        let temp_path = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        if let Err(e) = Self::write_file(&temp_path, &path, json.as_bytes()) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(paths::entry_path(&self.dir, key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
