//! Explicit invalidation

use super::TieredCache;
use crate::errors::Result;
use crate::keys::CacheKey;
use crate::tier::CacheTier;
use tracing::{debug, warn};

impl TieredCache {
    /// Remove an entity from hot, warm and cold together with its metadata
    /// and optimization entries.
    ///
    /// Absent keys are not an error. Every tier is attempted; if any store
    /// fails the first error is returned, since the entity may still be
    /// served stale from that tier.
    pub async fn invalidate(&self, entity_id: &str) -> Result<()> {
        let mut first_error = None;
        let mut removed = 0usize;

        for tier in CacheTier::ENTITY_SCOPED {
            let key = CacheKey::entity(tier, entity_id);
            match self.store(tier).delete(&key).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    self.inner.counters.record_store_error();
                    warn!(entity_id, tier = %tier, error = %e, "Invalidation failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        debug!(entity_id, removed, "Invalidated template cache entries");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Clear the popular-entities slot
    pub async fn invalidate_popular(&self) -> Result<()> {
        self.store(CacheTier::Popular)
            .delete(CacheKey::popular())
            .await?;
        debug!("Invalidated popular templates");
        Ok(())
    }

    /// Best-effort removal of search entries whose key matches `pattern`
    /// (a glob relative to the search namespace; `*` removes all).
    ///
    /// Store failures are logged and swallowed. Returns how many entries
    /// were removed.
    pub async fn invalidate_search_results(&self, pattern: &str) -> usize {
        let store = self.store(CacheTier::Search);
        let full_pattern = CacheKey::search_pattern(pattern);

        let keys = match store.keys(&full_pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                self.inner.counters.record_store_error();
                warn!(pattern = %full_pattern, error = %e, "Search cache invalidation skipped");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys {
            match store.delete(&key).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => {
                    self.inner.counters.record_store_error();
                    warn!(key = %key, error = %e, "Failed to remove search cache entry");
                }
            }
        }

        debug!(pattern = %full_pattern, removed, "Invalidated search results");
        removed
    }
}
