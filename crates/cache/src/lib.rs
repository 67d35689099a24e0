//! Template cache for the alumni platform
//!
//! This crate provides the tiered caching layer in front of template
//! rendering:
//! - Hot/warm/cold promotion chain with per-tier TTLs
//! - Single-store caches for metadata, optimization data, popular lists and
//!   search results
//! - Cascading invalidation and bulk warm-up
//! - Pluggable key-value stores with an in-process reference store

pub mod config;
pub mod entity;
pub mod errors;
pub mod keys;
pub mod store;
pub mod tier;
pub mod tiered;

pub use config::{CacheConfig, CacheConfigBuilder, CacheConfigLoader, ConfigSource};
pub use entity::CacheableEntity;
pub use errors::{CacheError, RecoveryHint, Result};
pub use keys::CacheKey;
pub use store::{KeyValueStore, MemoryStore, StoreInfo};
pub use tier::{CacheTier, TierTtls};
pub use tiered::{CacheStoreStats, TierCounters, TierStores, TieredCache};
