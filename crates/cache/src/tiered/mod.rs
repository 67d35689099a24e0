//! Hot/warm/cold template cache with read-through promotion
//!
//! Lookups walk the chain fastest first. A hit in a slower tier is copied
//! into every faster tier, so the hierarchy reorganises itself around current
//! access patterns without an explicit LRU structure:
//!
//! ```text
//!   get_or_compute(id)
//!        │
//!   ┌────▼────┐ hit ──────────────────────────────► value
//!   │   hot   │
//!   └────┬────┘ miss
//!   ┌────▼────┐ hit ──► write hot ─────────────────► value
//!   │  warm   │
//!   └────┬────┘ miss
//!   ┌────▼────┐ hit ──► write warm, hot ───────────► value
//!   │  cold   │
//!   └────┬────┘ miss
//!   producer() ──► write cold, warm, hot ──────────► value
//! ```
//!
//! Store errors never fail a lookup: a read error is a miss and a write error
//! is logged, so an unreachable cache server degrades to "always call the
//! producer".

mod get;
mod invalidate;
mod stats;
mod warm;

pub use stats::{CacheStoreStats, TierCounters};

use crate::config::CacheConfig;
use crate::store::{KeyValueStore, MemoryStore};
use crate::tier::CacheTier;
use stats::CounterSet;
use std::sync::Arc;

/// One store handle per tier, fixed at construction
#[derive(Clone)]
pub struct TierStores {
    stores: [Arc<dyn KeyValueStore>; 7],
}

impl TierStores {
    pub fn new(
        hot: Arc<dyn KeyValueStore>,
        warm: Arc<dyn KeyValueStore>,
        cold: Arc<dyn KeyValueStore>,
        metadata: Arc<dyn KeyValueStore>,
        optimization: Arc<dyn KeyValueStore>,
        popular: Arc<dyn KeyValueStore>,
        search: Arc<dyn KeyValueStore>,
    ) -> Self {
        // Order must follow `CacheTier::index`
        Self {
            stores: [hot, warm, cold, metadata, optimization, popular, search],
        }
    }

    /// A separate in-process store for every tier
    pub fn in_memory() -> Self {
        let store = |tier: CacheTier| -> Arc<dyn KeyValueStore> {
            Arc::new(MemoryStore::new(tier.as_str()))
        };
        Self::new(
            store(CacheTier::Hot),
            store(CacheTier::Warm),
            store(CacheTier::Cold),
            store(CacheTier::Metadata),
            store(CacheTier::Optimization),
            store(CacheTier::Popular),
            store(CacheTier::Search),
        )
    }

    /// Every tier on one server; keys are tier-prefixed so they cannot clash
    pub fn shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            stores: std::array::from_fn(|_| Arc::clone(&store)),
        }
    }

    /// Replace the handle of a single tier
    pub fn with_tier(mut self, tier: CacheTier, store: Arc<dyn KeyValueStore>) -> Self {
        self.stores[tier.index()] = store;
        self
    }

    pub fn get(&self, tier: CacheTier) -> &Arc<dyn KeyValueStore> {
        &self.stores[tier.index()]
    }
}

impl std::fmt::Debug for TierStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_map();
        for tier in CacheTier::ALL {
            list.entry(&tier.as_str(), &self.get(tier).name());
        }
        list.finish()
    }
}

/// Tiered cache over injected store handles
#[derive(Clone)]
pub struct TieredCache {
    inner: Arc<TieredCacheInner>,
}

struct TieredCacheInner {
    stores: TierStores,
    config: CacheConfig,
    counters: CounterSet,
}

impl TieredCache {
    pub fn new(stores: TierStores, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(TieredCacheInner {
                stores,
                config,
                counters: CounterSet::default(),
            }),
        }
    }

    /// In-process stores with default TTLs
    pub fn in_memory() -> Self {
        Self::new(TierStores::in_memory(), CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn stores(&self) -> &TierStores {
        &self.inner.stores
    }

    fn store(&self, tier: CacheTier) -> &Arc<dyn KeyValueStore> {
        self.inner.stores.get(tier)
    }
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("stores", &self.inner.stores)
            .field("ttls", &self.inner.config.ttls)
            .finish()
    }
}
