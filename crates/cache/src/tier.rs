//! Cache tiers and their retention windows

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// One named cache store, ordered by speed/retention trade-off.
///
/// `Hot`, `Warm` and `Cold` form the promotion chain; the remaining tiers are
/// single stores for data derived from an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    Hot,
    Warm,
    Cold,
    Metadata,
    Optimization,
    Popular,
    Search,
}

impl CacheTier {
    /// Promotion chain, fastest first
    pub const CHAIN: [CacheTier; 3] = [CacheTier::Hot, CacheTier::Warm, CacheTier::Cold];

    /// Every tier an entity change must clear
    pub const ENTITY_SCOPED: [CacheTier; 5] = [
        CacheTier::Hot,
        CacheTier::Warm,
        CacheTier::Cold,
        CacheTier::Metadata,
        CacheTier::Optimization,
    ];

    pub const ALL: [CacheTier; 7] = [
        CacheTier::Hot,
        CacheTier::Warm,
        CacheTier::Cold,
        CacheTier::Metadata,
        CacheTier::Optimization,
        CacheTier::Popular,
        CacheTier::Search,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CacheTier::Hot => "hot",
            CacheTier::Warm => "warm",
            CacheTier::Cold => "cold",
            CacheTier::Metadata => "metadata",
            CacheTier::Optimization => "optimization",
            CacheTier::Popular => "popular",
            CacheTier::Search => "search",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time-to-live per tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTtls {
    pub hot: Duration,
    pub warm: Duration,
    pub cold: Duration,
    pub metadata: Duration,
    pub optimization: Duration,
    pub popular: Duration,
}

impl Default for TierTtls {
    fn default() -> Self {
        Self {
            hot: Duration::from_secs(60),
            warm: Duration::from_secs(3600),
            cold: Duration::from_secs(86400),
            metadata: Duration::from_secs(300),
            optimization: Duration::from_secs(1800),
            popular: Duration::from_secs(3600),
        }
    }
}

impl TierTtls {
    /// TTL applied to writes into `tier`. Search results share the warm TTL.
    pub fn ttl(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::Hot => self.hot,
            CacheTier::Warm | CacheTier::Search => self.warm,
            CacheTier::Cold => self.cold,
            CacheTier::Metadata => self.metadata,
            CacheTier::Optimization => self.optimization,
            CacheTier::Popular => self.popular,
        }
    }
}
