//! Get-or-compute operations

use super::TieredCache;
use crate::keys::CacheKey;
use crate::tier::CacheTier;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tracing::{debug, warn};

/// Whether a lookup feeds the hit and miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Accounting {
    Record,
    /// Warm-up traffic, which is not caller demand
    Skip,
}

impl TieredCache {
    /// Fetch an entity through hot, warm and cold, calling `producer` only
    /// when every tier misses.
    ///
    /// Producer errors are returned unchanged and nothing is cached.
    pub async fn get_or_compute<T, E, F, Fut>(&self, entity_id: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute_chain(entity_id, producer, Accounting::Record).await
    }

    pub(super) async fn get_or_compute_chain<T, E, F, Fut>(
        &self,
        entity_id: &str,
        producer: F,
        accounting: Accounting,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        for (depth, tier) in CacheTier::CHAIN.into_iter().enumerate() {
            let key = CacheKey::entity(tier, entity_id);
            if let Some(value) = self.read::<T>(tier, &key).await {
                if accounting == Accounting::Record {
                    self.inner.counters.record_hit(tier);
                }
                debug!(entity_id, tier = %tier, "Template cache hit");

                // Copy upward, nearest tier first
                for faster in CacheTier::CHAIN[..depth].iter().rev() {
                    self.write(*faster, &CacheKey::entity(*faster, entity_id), &value)
                        .await;
                }
                return Ok(value);
            }
        }

        debug!(entity_id, "Template cache miss, invoking producer");
        let value = match accounting {
            Accounting::Record => self.produce(producer).await?,
            Accounting::Skip => producer().await?,
        };

        for tier in CacheTier::CHAIN.into_iter().rev() {
            self.write(tier, &CacheKey::entity(tier, entity_id), &value)
                .await;
        }
        Ok(value)
    }

    /// Get-or-compute against the metadata store
    pub async fn get_or_compute_metadata<T, E, F, Fut>(
        &self,
        entity_id: &str,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::entity(CacheTier::Metadata, entity_id);
        self.get_or_compute_single(CacheTier::Metadata, &key, producer)
            .await
    }

    /// Get-or-compute against the optimization-data store
    pub async fn get_or_compute_optimization<T, E, F, Fut>(
        &self,
        entity_id: &str,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::entity(CacheTier::Optimization, entity_id);
        self.get_or_compute_single(CacheTier::Optimization, &key, producer)
            .await
    }

    /// Get-or-compute the popular-entities list
    pub async fn get_or_compute_popular<T, E, F, Fut>(&self, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_compute_single(CacheTier::Popular, CacheKey::popular(), producer)
            .await
    }

    /// Get-or-compute search results keyed by query text and filter set
    pub async fn get_or_compute_search_results<T, E, F, Fut>(
        &self,
        query: &str,
        filters: &HashMap<String, Value>,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::search(query, filters);
        self.get_or_compute_single(CacheTier::Search, &key, producer)
            .await
    }

    /// Direct read of one tier, without promotion or hit accounting
    pub async fn peek<T: DeserializeOwned>(&self, tier: CacheTier, entity_id: &str) -> Option<T> {
        self.read(tier, &CacheKey::entity(tier, entity_id)).await
    }

    pub async fn contains(&self, tier: CacheTier, entity_id: &str) -> bool {
        self.peek::<Value>(tier, entity_id).await.is_some()
    }

    async fn get_or_compute_single<T, E, F, Fut>(
        &self,
        tier: CacheTier,
        key: &str,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.read::<T>(tier, key).await {
            self.inner.counters.record_hit(tier);
            debug!(key, tier = %tier, "Cache hit");
            return Ok(value);
        }

        debug!(key, tier = %tier, "Cache miss, invoking producer");
        let value = self.produce(producer).await?;
        self.write(tier, key, &value).await;
        Ok(value)
    }

    async fn produce<T, E, F, Fut>(&self, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.inner.counters.record_miss();
        let result = producer().await;
        if result.is_err() {
            self.inner.counters.record_producer_failure();
        }
        result
    }

    /// Read and decode; store and decode errors both count as a miss
    pub(super) async fn read<T: DeserializeOwned>(&self, tier: CacheTier, key: &str) -> Option<T> {
        let bytes = match self.store(tier).get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                self.inner.counters.record_store_error();
                warn!(key, tier = %tier, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, tier = %tier, error = %e, "Undecodable cache entry, treating as miss");
                None
            }
        }
    }

    /// Encode and store with the tier's TTL; failures are logged only
    pub(super) async fn write<T: Serialize>(&self, tier: CacheTier, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, tier = %tier, error = %e, "Unserializable value, skipping write");
                return;
            }
        };

        let ttl = self.inner.config.ttls.ttl(tier);
        if let Err(e) = self.store(tier).set(key, bytes, ttl).await {
            self.inner.counters.record_store_error();
            warn!(key, tier = %tier, error = %e, "Cache write failed");
        }
    }
}
