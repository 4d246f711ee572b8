//! Bounded, concurrent flow table
//!
//! The one piece of state shared across packet-processing contexts. Lookups
//! must never block for unbounded time and must not allocate; writes are the
//! control plane's business and are comparatively rare. The table is a
//! cache, not a durable store: under insertion pressure the least-recently-
//! touched entry is silently evicted, and the control plane must be prepared
//! to re-register a flow it still cares about.
//!
//! [`LruFlowTable`] is backed by `moka`'s sync cache, which gives bounded
//! capacity with LRU-style eviction and lock-free reads from the caller's
//! perspective. Slightly stale reads are an accepted tradeoff for bounded
//! lookup latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;

use super::key::FlowKey;
use super::tag::FlowTag;

/// Default table capacity (entries), matching the reference deployment.
pub const DEFAULT_TABLE_CAPACITY: u64 = 100_000;

/// Flow table statistics
///
/// All counters are atomic for thread-safe access without locking.
#[derive(Debug, Default)]
pub struct TableStats {
    /// Lookups that found an entry
    hits: AtomicU64,
    /// Lookups that found nothing
    misses: AtomicU64,
    /// Entries inserted by the control plane
    inserts: AtomicU64,
    /// Entries removed by the control plane
    removals: AtomicU64,
    /// Entries evicted by the capacity bound
    evictions: AtomicU64,
}

impl TableStats {
    /// Record a lookup hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an insertion
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an explicit removal
    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a capacity eviction
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get hit count
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get miss count
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get insertion count
    #[must_use]
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get removal count
    #[must_use]
    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    /// Get eviction count
    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

/// The flow table interface shared by the packet path and the control plane.
///
/// The packet path only ever calls [`FlowTable::lookup`]; population and
/// eviction belong to the control plane. Implementations must keep lookups
/// non-blocking and bounded in time.
pub trait FlowTable: Send + Sync {
    /// Look up the tag registered for `key`, if any.
    fn lookup(&self, key: &FlowKey) -> Option<FlowTag>;

    /// Register or update a flow. Control-plane only.
    fn insert(&self, key: FlowKey, tag: FlowTag);

    /// Unregister a flow. Control-plane only.
    fn remove(&self, key: &FlowKey);

    /// Approximate number of live entries.
    fn len(&self) -> usize;

    /// Check whether the table is (approximately) empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded LRU-evicting flow table backed by `moka`.
pub struct LruFlowTable {
    cache: Cache<FlowKey, FlowTag>,
    stats: Arc<TableStats>,
}

impl LruFlowTable {
    /// Create a table bounded to `capacity` entries.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let stats = Arc::new(TableStats::default());
        let listener_stats = Arc::clone(&stats);

        let cache = Cache::builder()
            .max_capacity(capacity)
            .eviction_listener(move |key: Arc<FlowKey>, _tag, cause| {
                if cause == RemovalCause::Size {
                    debug!("flow table evicted entry under capacity pressure: {key:?}");
                    listener_stats.record_eviction();
                }
            })
            .build();

        Self { cache, stats }
    }

    /// Create a table with the reference deployment's capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_TABLE_CAPACITY)
    }

    /// Table statistics.
    #[must_use]
    pub fn stats(&self) -> &TableStats {
        &self.stats
    }

    /// Flush pending maintenance work (evictions, counters).
    ///
    /// `moka` defers housekeeping; tests that assert on entry counts after
    /// insertion pressure call this to make the state observable.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl FlowTable for LruFlowTable {
    fn lookup(&self, key: &FlowKey) -> Option<FlowTag> {
        let tag = self.cache.get(key);
        match tag {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        tag
    }

    fn insert(&self, key: FlowKey, tag: FlowTag) {
        self.cache.insert(key, tag);
        self.stats.record_insert();
    }

    fn remove(&self, key: &FlowKey) {
        self.cache.invalidate(key);
        self.stats.record_removal();
    }

    fn len(&self) -> usize {
        usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX)
    }
}

impl std::fmt::Debug for LruFlowTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruFlowTable")
            .field("entries", &self.len())
            .field("hits", &self.stats.hits())
            .field("misses", &self.stats.misses())
            .finish()
    }
}
