//! Derived per-entity performance statistics

use crate::config::RecommendationThresholds;
use crate::sample::PerformanceSample;
use serde::{Deserialize, Serialize};

pub const RECOMMEND_TEMPLATE_STRUCTURE: &str = "Optimize template structure or add indexes";
pub const RECOMMEND_CACHE_HIT_RATIO: &str = "Improve cache hit ratio";
pub const RECOMMEND_MEMORY: &str = "Monitor memory usage";

const RENDER_WEIGHT: f64 = 0.4;
const CACHE_WEIGHT: f64 = 0.4;
const MEMORY_WEIGHT: f64 = 0.2;

/// Aggregate over a sample window. Recomputed on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub sample_count: usize,
    pub avg_render_time_ms: f64,
    pub cache_hit_ratio: f64,
    pub avg_memory_usage_pct: f64,
    /// Weighted 0-100 composite
    pub performance_score: f64,
    pub recommendations: Vec<String>,
}

impl PerformanceStats {
    /// Zero-valued stats for an entity with no samples
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_samples(
        samples: &[PerformanceSample],
        thresholds: &RecommendationThresholds,
    ) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let count = samples.len() as f64;
        let avg_render_time_ms = samples.iter().map(|s| s.render_time_ms).sum::<f64>() / count;
        let hits = samples.iter().filter(|s| s.cache_hit).count() as f64;
        let cache_hit_ratio = hits / count;
        let avg_memory_usage_pct = samples
            .iter()
            .map(|s| f64::from(s.memory_usage_pct))
            .sum::<f64>()
            / count;

        let mut recommendations = Vec::new();
        if avg_render_time_ms > thresholds.render_time_ms {
            recommendations.push(RECOMMEND_TEMPLATE_STRUCTURE.to_string());
        }
        if cache_hit_ratio < thresholds.cache_hit_ratio {
            recommendations.push(RECOMMEND_CACHE_HIT_RATIO.to_string());
        }
        if avg_memory_usage_pct > thresholds.memory_usage_pct {
            recommendations.push(RECOMMEND_MEMORY.to_string());
        }

        Self {
            sample_count: samples.len(),
            avg_render_time_ms,
            cache_hit_ratio,
            avg_memory_usage_pct,
            performance_score: performance_score(
                avg_render_time_ms,
                cache_hit_ratio,
                avg_memory_usage_pct,
            ),
            recommendations,
        }
    }
}

/// `0.4 * render + 0.4 * cache + 0.2 * memory`, each component on 0-100
pub fn performance_score(
    avg_render_time_ms: f64,
    cache_hit_ratio: f64,
    avg_memory_pct: f64,
) -> f64 {
    let render_score = (100.0 - avg_render_time_ms / 10.0).max(0.0);
    let cache_score = cache_hit_ratio * 100.0;
    let memory_score = (100.0 - avg_memory_pct).max(0.0);

    RENDER_WEIGHT * render_score + CACHE_WEIGHT * cache_score + MEMORY_WEIGHT * memory_score
}
