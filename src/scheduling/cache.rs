//! In-memory cache for availability lookups.
//!
//! Calendar availability changes slowly, so lookups are memoized per
//! `(date, timezone)` key with a short time-to-live. A stale entry is
//! evicted lazily when it is looked up; every write additionally sweeps
//! entries past a coarser staleness bound so the map cannot grow without
//! limit over a long-lived process. There is no size-based eviction: the
//! key space (dates times timezones) is small and entries expire quickly.
//!
//! The cache never guarantees freshness, only bounds staleness — callers
//! accept up to one TTL of drift against the real calendar.
//!
//! Time is read through the [`Clock`] trait so tests can drive expiry
//! deterministically with a fake clock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Clock backed by the system's monotonic time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cache key: the date being queried and the timezone the slots are in.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SlotKey {
    /// Date in `YYYY-MM-DD` format
    pub date: String,
    /// IANA timezone identifier
    pub timezone: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    slots: Vec<String>,
    created_at: Instant,
}

/// Availability cache with TTL expiry and write-time staleness sweep.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use levrok::scheduling::AvailabilityCache;
///
/// let mut cache = AvailabilityCache::new(Duration::from_secs(300), Duration::from_secs(3600));
/// cache.store("2026-03-02", "America/New_York", vec!["11:00".into()]);
/// assert!(cache.lookup("2026-03-02", "America/New_York").is_some());
/// assert!(cache.lookup("2026-03-03", "America/New_York").is_none());
/// ```
pub struct AvailabilityCache {
    entries: HashMap<SlotKey, CacheEntry>,
    ttl: Duration,
    stale_after: Duration,
    clock: Arc<dyn Clock>,
}

impl AvailabilityCache {
    /// Create a cache using the system clock.
    pub fn new(ttl: Duration, stale_after: Duration) -> Self {
        Self::with_clock(ttl, stale_after, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock (used by tests).
    pub fn with_clock(ttl: Duration, stale_after: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            stale_after,
            clock,
        }
    }

    /// Return cached slots when a fresh entry exists.
    ///
    /// An entry older than the TTL is evicted and treated as a miss.
    pub fn lookup(&mut self, date: &str, timezone: &str) -> Option<Vec<String>> {
        let key = SlotKey {
            date: date.to_string(),
            timezone: timezone.to_string(),
        };
        let now = self.clock.now();

        let age = now.saturating_duration_since(self.entries.get(&key)?.created_at);
        if age > self.ttl {
            self.entries.remove(&key);
            return None;
        }

        tracing::debug!(
            "Availability cache hit for {} (age: {}s)",
            date,
            age.as_secs()
        );
        self.entries.get(&key).map(|entry| entry.slots.clone())
    }

    /// Store a lookup result and sweep entries past the staleness bound.
    pub fn store(&mut self, date: &str, timezone: &str, slots: Vec<String>) {
        let key = SlotKey {
            date: date.to_string(),
            timezone: timezone.to_string(),
        };
        let now = self.clock.now();

        self.entries.insert(
            key,
            CacheEntry {
                slots,
                created_at: now,
            },
        );

        // Best-effort bound on growth; stale entries would miss on lookup
        // anyway, this just reclaims the memory.
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.created_at) <= self.stale_after);
    }

    /// Number of entries currently held (fresh or not yet swept).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
