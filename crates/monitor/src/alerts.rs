//! Threshold checks for a single render

use crate::config::AlertThresholds;
use crate::sample::PerformanceSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observability signal raised by `record_render`. Logged, never thrown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerformanceAlert {
    SlowRender {
        entity_id: String,
        render_time_ms: f64,
        limit_ms: f64,
    },
    CacheMiss {
        entity_id: String,
    },
    HighMemory {
        entity_id: String,
        memory_usage_pct: u32,
        limit_pct: u32,
    },
}

impl PerformanceAlert {
    /// Metric label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SlowRender { .. } => "slow_render",
            Self::CacheMiss { .. } => "cache_miss",
            Self::HighMemory { .. } => "high_memory",
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::SlowRender { entity_id, .. }
            | Self::CacheMiss { entity_id }
            | Self::HighMemory { entity_id, .. } => entity_id,
        }
    }
}

impl fmt::Display for PerformanceAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlowRender {
                entity_id,
                render_time_ms,
                limit_ms,
            } => write!(
                f,
                "Slow render for template {entity_id}: {render_time_ms}ms exceeds {limit_ms}ms"
            ),
            Self::CacheMiss { entity_id } => {
                write!(f, "Cache miss while rendering template {entity_id}")
            }
            Self::HighMemory {
                entity_id,
                memory_usage_pct,
                limit_pct,
            } => write!(
                f,
                "High memory usage rendering template {entity_id}: {memory_usage_pct}% exceeds {limit_pct}%"
            ),
        }
    }
}

/// Every threshold the sample breaches
pub fn check_thresholds(
    sample: &PerformanceSample,
    thresholds: &AlertThresholds,
) -> Vec<PerformanceAlert> {
    let mut alerts = Vec::new();

    if sample.render_time_ms > thresholds.render_time_ms {
        alerts.push(PerformanceAlert::SlowRender {
            entity_id: sample.entity_id.clone(),
            render_time_ms: sample.render_time_ms,
            limit_ms: thresholds.render_time_ms,
        });
    }

    if !sample.cache_hit && thresholds.alert_on_cache_miss {
        alerts.push(PerformanceAlert::CacheMiss {
            entity_id: sample.entity_id.clone(),
        });
    }

    if sample.memory_usage_pct > thresholds.memory_usage_pct {
        alerts.push(PerformanceAlert::HighMemory {
            entity_id: sample.entity_id.clone(),
            memory_usage_pct: sample.memory_usage_pct,
            limit_pct: thresholds.memory_usage_pct,
        });
    }

    alerts
}
