//! Render performance monitor

use crate::alerts::{check_thresholds, PerformanceAlert};
use crate::analyzer::{AggregateTracker, MemoryTrend, SlowEntity};
use crate::config::MonitorConfig;
use crate::errors::{MonitorError, Result};
use crate::metrics::MetricsCollector;
use crate::repository::EntityRepository;
use crate::sample::{series_key, PerformanceSample};
use crate::series::TimeSeriesStore;
use crate::stats::{PerformanceStats, RECOMMEND_MEMORY};
use crate::ttl::{NoopTtlAdvisor, TtlAdjustment, TtlAdvisor};
use alumni_cache::{CacheStoreStats, CacheableEntity, TierCounters, TieredCache};
use parking_lot::RwLock;
use prometheus::{Encoder, Registry, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const RECOMMEND_WARM_POPULAR: &str = "Warm up popular templates to raise the cache hit ratio";
pub const RECOMMEND_SLOW_TEMPLATES: &str = "Review slow templates";

/// System-wide view returned by [`PerformanceMonitor::get_system_metrics`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cache_stats: CacheStoreStats,
    pub cache_counters: TierCounters,
    /// `None` when the repository could not be queried
    pub active_entity_count: Option<usize>,
    pub slow_entities: Vec<SlowEntity>,
    pub system_cache_hit_ratio: f64,
    pub memory_trend: MemoryTrend,
    pub recommendations: Vec<String>,
}

/// Outcome of one [`PerformanceMonitor::optimize_cache`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Frequent entities written to the hot tier
    pub warmed: usize,
    pub search_entries_invalidated: usize,
    /// Suggestions from the installed [`TtlAdvisor`]; not applied
    pub ttl_adjustments: Vec<TtlAdjustment>,
}

/// Records render samples, derives statistics and drives cache warm-up.
///
/// The monitor writes only to its time-series keyspace. Cache tiers are
/// reached through [`TieredCache`] for warm-up and invalidation.
pub struct PerformanceMonitor<T> {
    inner: Arc<MonitorInner<T>>,
}

struct MonitorInner<T> {
    cache: TieredCache,
    series: Arc<dyn TimeSeriesStore>,
    repository: Arc<dyn EntityRepository<T>>,
    config: MonitorConfig,
    aggregates: AggregateTracker,
    metrics: MetricsCollector,
    registry: Registry,
    ttl_advisor: RwLock<Arc<dyn TtlAdvisor>>,
}

impl<T> Clone for PerformanceMonitor<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: CacheableEntity> PerformanceMonitor<T> {
    pub fn new(
        cache: TieredCache,
        series: Arc<dyn TimeSeriesStore>,
        repository: Arc<dyn EntityRepository<T>>,
        config: MonitorConfig,
    ) -> Result<Self> {
        config.validate()?;

        let registry = Registry::new();
        let metrics = MetricsCollector::init(&registry)?;
        let aggregates = AggregateTracker::new(config.series_ttl);

        Ok(Self {
            inner: Arc::new(MonitorInner {
                cache,
                series,
                repository,
                config,
                aggregates,
                metrics,
                registry,
                ttl_advisor: RwLock::new(Arc::new(NoopTtlAdvisor)),
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &TieredCache {
        &self.inner.cache
    }

    /// Record one render and return the alerts it raised.
    ///
    /// Never fails: time-series errors are logged and the in-process
    /// aggregates are still updated.
    pub async fn record_render(
        &self,
        entity_id: &str,
        render_time_ms: f64,
        cache_hit: bool,
        memory_usage_pct: u32,
    ) -> Vec<PerformanceAlert> {
        let sample = PerformanceSample::new(entity_id, render_time_ms, cache_hit, memory_usage_pct);
        let key = series_key(entity_id);

        let appended = self.inner.series.append(&key, sample.clone()).await;
        match appended {
            Ok(()) => {
                let expiry = self
                    .inner
                    .series
                    .set_expiry(&key, self.inner.config.series_ttl)
                    .await;
                if let Err(e) = expiry {
                    warn!(entity_id, error = %e, "Failed to refresh performance series expiry");
                }
            }
            Err(e) => warn!(entity_id, error = %e, "Failed to record performance sample"),
        }

        self.inner.aggregates.record(&sample);
        self.inner.metrics.record_sample(&sample);

        debug!(
            entity_id,
            render_time_ms,
            cache_hit,
            memory_usage_pct,
            "Recorded template render"
        );

        let alerts = check_thresholds(&sample, &self.inner.config.alerts);
        for alert in &alerts {
            self.inner.metrics.record_alert(alert.kind());
            warn!(
                entity_id = alert.entity_id(),
                render_time_ms,
                kind = alert.kind(),
                "{alert}"
            );
        }
        alerts
    }

    /// Stats over the most recent samples; zero stats when there are none
    pub async fn get_stats(&self, entity_id: &str) -> PerformanceStats {
        let samples = match self
            .inner
            .series
            .read_recent(&series_key(entity_id), self.inner.config.stats_window)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(entity_id, error = %e, "Failed to read performance samples");
                return PerformanceStats::empty();
            }
        };

        PerformanceStats::from_samples(&samples, &self.inner.config.recommendations)
    }

    pub async fn get_system_metrics(&self) -> SystemMetrics {
        let cache_stats = self.inner.cache.stats().await;
        let cache_counters = self.inner.cache.tier_counters();
        let thresholds = &self.inner.config.recommendations;

        let active_entity_count = match self.inner.repository.count_active().await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Failed to count active templates");
                None
            }
        };

        let slow_entities = self
            .inner
            .aggregates
            .slow_entities(thresholds.render_time_ms, self.inner.config.slow_entity_limit);

        // Cache counters cover lookups made before any render was reported
        let system_cache_hit_ratio = self
            .inner
            .aggregates
            .hit_ratio()
            .unwrap_or_else(|| cache_counters.hit_ratio());

        let memory_trend = self.inner.aggregates.memory_trend();

        let mut recommendations = Vec::new();
        if system_cache_hit_ratio < thresholds.system_cache_hit_ratio {
            recommendations.push(RECOMMEND_WARM_POPULAR.to_string());
        }
        if !slow_entities.is_empty() {
            recommendations.push(RECOMMEND_SLOW_TEMPLATES.to_string());
        }
        if memory_trend == MemoryTrend::Increasing {
            recommendations.push(RECOMMEND_MEMORY.to_string());
        }

        SystemMetrics {
            cache_stats,
            cache_counters,
            active_entity_count,
            slow_entities,
            system_cache_hit_ratio,
            memory_trend,
            recommendations,
        }
    }

    /// [`warm_up_popular`](Self::warm_up_popular) sized by
    /// `MonitorConfig::popular_count`
    pub async fn warm_up_popular_default(&self) -> Result<usize> {
        self.warm_up_popular(self.inner.config.popular_count).await
    }

    /// Warm the cache chain with the `count` most used active entities
    pub async fn warm_up_popular(&self, count: usize) -> Result<usize> {
        let popular = self
            .inner
            .repository
            .most_used_active(count)
            .await
            .map_err(|e| MonitorError::repository("most_used_active", e))?;

        let warmed = self.inner.cache.warm_up(&popular).await;
        info!(requested = count, warmed, "Warmed popular templates");
        Ok(warmed)
    }

    /// Warm frequently used entities, clear stale search results and consult
    /// the TTL advisor
    pub async fn optimize_cache(&self) -> Result<OptimizationReport> {
        let config = &self.inner.config;

        let frequent = self
            .inner
            .repository
            .frequently_used_active(config.frequent_min_usage, config.frequent_limit)
            .await
            .map_err(|e| MonitorError::repository("frequently_used_active", e))?;
        let warmed = self.inner.cache.warm_up(&frequent).await;

        let search_entries_invalidated = self
            .inner
            .cache
            .invalidate_search_results(&config.search_invalidation_pattern)
            .await;

        let advisor = Arc::clone(&*self.inner.ttl_advisor.read());
        let ttl_adjustments =
            advisor.advise(self.inner.aggregates.hit_ratio(), &self.inner.cache.config().ttls);

        info!(
            warmed,
            search_entries_invalidated,
            ttl_adjustments = ttl_adjustments.len(),
            "Cache optimization complete"
        );

        Ok(OptimizationReport {
            warmed,
            search_entries_invalidated,
            ttl_adjustments,
        })
    }

    pub fn set_ttl_advisor(&self, advisor: Arc<dyn TtlAdvisor>) {
        *self.inner.ttl_advisor.write() = advisor;
    }

    /// Prometheus text exposition of the render metrics
    pub fn metrics_text(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
