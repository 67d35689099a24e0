//! Cache introspection

use super::TieredCache;
use crate::tier::CacheTier;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Backing-store view reported by [`TieredCache::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStoreStats {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// In-process hit/miss counts since the cache was created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounters {
    /// Hits per tier, indexed like [`CacheTier::ALL`]
    pub hits: [u64; 7],
    /// Producer invocations
    pub misses: u64,
    pub producer_failures: u64,
    pub store_errors: u64,
}

impl TierCounters {
    pub fn hits_for(&self, tier: CacheTier) -> u64 {
        self.hits[tier.index()]
    }

    pub fn total_hits(&self) -> u64 {
        self.hits.iter().sum()
    }

    /// Hits over lookups; 0.0 before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.total_hits();
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct CounterSet {
    hits: [AtomicU64; 7],
    misses: AtomicU64,
    producer_failures: AtomicU64,
    store_errors: AtomicU64,
}

impl CounterSet {
    pub(super) fn record_hit(&self, tier: CacheTier) {
        self.hits[tier.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_producer_failure(&self) {
        self.producer_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TierCounters {
        TierCounters {
            hits: std::array::from_fn(|i| self.hits[i].load(Ordering::Relaxed)),
            misses: self.misses.load(Ordering::Relaxed),
            producer_failures: self.producer_failures.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

impl TieredCache {
    /// Introspect the warm/cold backing store. Never fails: an unreachable
    /// store is reported as `connected: false` with the error message.
    pub async fn stats(&self) -> CacheStoreStats {
        match self.store(CacheTier::Warm).info().await {
            Ok(info) => CacheStoreStats {
                connected: true,
                memory_used: Some(info.memory_used),
                key_count: Some(info.key_count),
                error: None,
            },
            Err(e) => CacheStoreStats {
                connected: false,
                memory_used: None,
                key_count: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn tier_counters(&self) -> TierCounters {
        self.inner.counters.snapshot()
    }
}
