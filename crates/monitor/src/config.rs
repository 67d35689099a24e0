//! Monitor thresholds and warm-up sizing

use crate::errors::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest expiry accepted for a performance series
pub const MAX_SERIES_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Limits that raise a warning for a single render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Render slower than this is an alert
    pub render_time_ms: f64,
    /// Memory usage above this percentage is an alert
    pub memory_usage_pct: u32,
    /// Whether a cache miss on its own raises an alert
    pub alert_on_cache_miss: bool,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            render_time_ms: 1000.0,
            memory_usage_pct: 80,
            alert_on_cache_miss: true,
        }
    }
}

/// Limits on window averages that produce recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationThresholds {
    pub render_time_ms: f64,
    pub cache_hit_ratio: f64,
    pub memory_usage_pct: f64,
    /// System-wide hit ratio below which warm-up is suggested
    pub system_cache_hit_ratio: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            render_time_ms: 500.0,
            cache_hit_ratio: 0.7,
            memory_usage_pct: 70.0,
            system_cache_hit_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub alerts: AlertThresholds,
    pub recommendations: RecommendationThresholds,
    /// Most recent samples considered by `get_stats`
    pub stats_window: usize,
    /// Expiry refreshed on every append to a series
    pub series_ttl: Duration,
    /// Default size of `warm_up_popular`
    pub popular_count: usize,
    /// Usage count an entity must exceed to count as frequent
    pub frequent_min_usage: u64,
    pub frequent_limit: usize,
    pub slow_entity_limit: usize,
    /// Search cache pattern cleared by `optimize_cache`
    pub search_invalidation_pattern: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alerts: AlertThresholds::default(),
            recommendations: RecommendationThresholds::default(),
            stats_window: 100,
            series_ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
            popular_count: 50,
            frequent_min_usage: 10,
            frequent_limit: 100,
            slow_entity_limit: 10,
            search_invalidation_pattern: "*".to_string(),
        }
    }
}

impl MonitorConfig {
    /// Defaults overridden by `ALUMNI_MONITOR_*` variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_parse::<f64>("ALUMNI_MONITOR_SLOW_RENDER_MS")? {
            config.alerts.render_time_ms = ms;
        }
        if let Some(pct) = env_parse::<u32>("ALUMNI_MONITOR_MEMORY_ALERT_PCT")? {
            config.alerts.memory_usage_pct = pct;
        }
        if let Some(flag) = env_parse::<bool>("ALUMNI_MONITOR_ALERT_ON_MISS")? {
            config.alerts.alert_on_cache_miss = flag;
        }
        if let Some(window) = env_parse::<usize>("ALUMNI_MONITOR_STATS_WINDOW")? {
            config.stats_window = window;
        }
        if let Some(hours) = env_parse::<u64>("ALUMNI_MONITOR_SERIES_TTL_HOURS")? {
            let secs = hours
                .checked_mul(60 * 60)
                .ok_or_else(|| MonitorError::Configuration {
                    message: format!("ALUMNI_MONITOR_SERIES_TTL_HOURS={hours} is out of range"),
                })?;
            config.series_ttl = Duration::from_secs(secs);
        }
        if let Some(count) = env_parse::<usize>("ALUMNI_MONITOR_POPULAR_COUNT")? {
            config.popular_count = count;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stats_window == 0 {
            return Err(MonitorError::Configuration {
                message: "stats_window must be at least 1".to_string(),
            });
        }
        if self.series_ttl.is_zero() {
            return Err(MonitorError::Configuration {
                message: "series_ttl must be greater than zero".to_string(),
            });
        }
        if self.series_ttl > MAX_SERIES_TTL {
            return Err(MonitorError::Configuration {
                message: "series_ttl must be at most one year".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.recommendations.cache_hit_ratio) {
            return Err(MonitorError::Configuration {
                message: "cache_hit_ratio threshold must be between 0 and 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MonitorError::Configuration {
                message: format!("{var}={raw}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}
