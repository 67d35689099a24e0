//! Bulk warm-up of the promotion chain

use super::get::Accounting;
use super::TieredCache;
use crate::entity::CacheableEntity;
use std::convert::Infallible;
use tracing::info;

impl TieredCache {
    /// Push already-loaded entities through get-or-compute so hot, warm and
    /// cold all hold them. No real fetch happens, and warm-up lookups are
    /// left out of the hit and miss counters.
    ///
    /// Returns the number of entities processed.
    pub async fn warm_up<T: CacheableEntity>(&self, entities: &[T]) -> usize {
        let mut warmed = 0;
        for entity in entities {
            let id = entity.cache_id();
            let result = self
                .get_or_compute_chain(
                    &id,
                    || async { Ok::<T, Infallible>(entity.clone()) },
                    Accounting::Skip,
                )
                .await;
            match result {
                Ok(_) => warmed += 1,
                Err(never) => match never {},
            }
        }

        if warmed > 0 {
            info!("Warmed {} template cache entries", warmed);
        }
        warmed
    }
}
