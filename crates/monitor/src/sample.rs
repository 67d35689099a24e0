//! Per-render performance samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed render. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub entity_id: String,
    pub render_time_ms: f64,
    pub cache_hit: bool,
    pub memory_usage_pct: u32,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSample {
    pub fn new(
        entity_id: impl Into<String>,
        render_time_ms: f64,
        cache_hit: bool,
        memory_usage_pct: u32,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            render_time_ms,
            cache_hit,
            memory_usage_pct,
            timestamp: Utc::now(),
        }
    }
}

/// Series holding an entity's samples, newest first
pub fn series_key(entity_id: &str) -> String {
    format!("performance:template:{entity_id}")
}
