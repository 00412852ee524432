// Key-value stores with per-entry TTL.
// Values are JSON documents; typed access goes through `read` and `write`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::clock::{Clock, SystemClock};

/// Opaque persistence used by the stats cache.
///
/// Each operation must be atomic for its key. A TTL of zero minutes keeps the
/// value until it is overwritten or removed.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value, ttl_minutes: u64) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// A stored value with its expiry metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredItem {
    pub value: Value,
    pub stored_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredItem {
    pub fn new(value: Value, now: DateTime<Utc>, ttl_minutes: u64) -> Self {
        // Out-of-range TTLs behave like zero.
        let expires_at = i64::try_from(ttl_minutes)
            .ok()
            .filter(|minutes| *minutes > 0)
            .and_then(Duration::try_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl));
        Self {
            value,
            stored_at: now,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Read a typed value. Values that do not decode as `T` read as missing.
pub fn read<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>> {
    let Some(value) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(typed) => Ok(Some(typed)),
        Err(e) => {
            debug!(key, error = %e, "ignoring undecodable cache value");
            Ok(None)
        }
    }
}

/// Write a typed value.
pub fn write<T: Serialize>(store: &dyn Store, key: &str, value: &T, ttl_minutes: u64) -> Result<()> {
    store.set(key, serde_json::to_value(value)?, ttl_minutes)
}

/// In-process store shared between tasks.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredItem>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.write().retain(|_, item| !item.is_expired(now));
    }

    /// Number of held entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Expiry recorded for `key`, if any.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().get(key).and_then(|item| item.expires_at)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(item) if !item.is_expired(now) => return Ok(Some(item.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|item| item.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl_minutes: u64) -> Result<()> {
        let item = StoredItem::new(value, self.clock.now(), ttl_minutes);
        self.entries.write().insert(key.to_string(), item);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
