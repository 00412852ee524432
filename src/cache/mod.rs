// Cache module for repository statistics.
// Stores, persisted entry types, the refresh policy, and the read-through cache.

pub mod clock;
pub mod entry;
pub mod fetcher;
pub mod file;
pub mod paths;
pub mod policy;
pub mod stats;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, ProviderDownMarker};
pub use fetcher::Fetcher;
pub use file::FileStore;
pub use policy::{Decision, RefreshPolicy, ServeReason};
pub use stats::{Session, StatsCache};
pub use store::{MemoryStore, Store};
