//! Aggregate report types

use serde::{Deserialize, Serialize};

/// Entity whose running mean render time is over the recommendation limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowEntity {
    pub entity_id: String,
    pub avg_render_time_ms: f64,
    pub samples: u64,
}

/// Direction of recent memory readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryTrend {
    Increasing,
    Decreasing,
    Stable,
    /// Not enough readings yet
    Unknown,
}
