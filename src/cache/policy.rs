// Refresh decision for a cached repository.
// Pure function of the observed cache state; no I/O.

use crate::config::Config;

/// TTL settings the decision depends on, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub lower_ttl: u64,
    pub upper_ttl: u64,
    pub max_refreshes: u32,
}

impl From<&Config> for RefreshPolicy {
    fn from(config: &Config) -> Self {
        Self {
            lower_ttl: config.cache_ttl_lower,
            upper_ttl: config.cache_ttl_upper,
            max_refreshes: config.max_refreshes_per_invocation,
        }
    }
}

/// What the cache observed for one lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Observation {
    /// Age of the cached data, `None` when nothing usable is cached.
    pub age_minutes: Option<f64>,
    /// The provider-wide backoff marker is active.
    pub provider_down: bool,
    /// The entry's own retry floor lies in the future.
    pub retry_floor: bool,
    /// Successful refreshes already made in this session.
    pub refreshes_used: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Serve(ServeReason),
    Refresh { hard_expiry: bool },
}

/// Why cached data (or nothing) is returned without a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeReason {
    Fresh,
    ProviderDown,
    RetryFloor,
    RefreshCapReached,
}

impl RefreshPolicy {
    pub fn decide(&self, seen: &Observation) -> Decision {
        let Some(age) = seen.age_minutes else {
            if seen.provider_down {
                return Decision::Serve(ServeReason::ProviderDown);
            }
            return Decision::Refresh { hard_expiry: false };
        };

        if age <= self.lower_ttl as f64 {
            return Decision::Serve(ServeReason::Fresh);
        }

        // Past the upper TTL every backoff is overridden.
        if age >= self.upper_ttl as f64 {
            return Decision::Refresh { hard_expiry: true };
        }

        if seen.provider_down {
            return Decision::Serve(ServeReason::ProviderDown);
        }
        if seen.retry_floor {
            return Decision::Serve(ServeReason::RetryFloor);
        }
        if seen.refreshes_used < self.max_refreshes {
            return Decision::Refresh { hard_expiry: false };
        }
        Decision::Serve(ServeReason::RefreshCapReached)
    }
}
