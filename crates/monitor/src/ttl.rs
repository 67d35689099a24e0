//! Extension point for adapting tier TTLs to observed hit ratios

use alumni_cache::{CacheTier, TierTtls};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Suggested TTL change for one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlAdjustment {
    pub tier: CacheTier,
    pub current: Duration,
    pub suggested: Duration,
}

/// Consulted by `optimize_cache` with the system hit ratio (`None` when no
/// renders were observed in the current window).
pub trait TtlAdvisor: Send + Sync {
    fn advise(&self, hit_ratio: Option<f64>, ttls: &TierTtls) -> Vec<TtlAdjustment>;
}

/// Keeps the configured TTLs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTtlAdvisor;

impl TtlAdvisor for NoopTtlAdvisor {
    fn advise(&self, _hit_ratio: Option<f64>, _ttls: &TierTtls) -> Vec<TtlAdjustment> {
        Vec::new()
    }
}
