//! In-process aggregates behind the system metrics
//!
//! The time-series store only answers per-entity queries, so the monitor
//! keeps running aggregates as samples arrive: per-entity render sums, a
//! one-hour hit/miss window and a ring of recent memory readings. They are
//! per-process and start empty on restart.

mod rolling_window;
mod types;

use self::rolling_window::RollingWindow;
use crate::sample::PerformanceSample;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub use types::{MemoryTrend, SlowEntity};

const HIT_WINDOW: Duration = Duration::from_secs(3600);
const MEMORY_READINGS: usize = 100;
const MIN_TREND_READINGS: usize = 10;
/// Percentage points between the older and newer halves that count as a trend
const TREND_DELTA_PCT: f64 = 5.0;
/// Samples between sweeps of stale entities
const PRUNE_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
struct EntityAggregate {
    samples: u64,
    total_render_ms: f64,
    last_seen: DateTime<Utc>,
}

pub struct AggregateTracker {
    entities: DashMap<String, EntityAggregate>,
    hit_window: RollingWindow,
    memory: Mutex<VecDeque<u32>>,
    retention: chrono::Duration,
    records: AtomicU64,
}

impl AggregateTracker {
    /// Entities not seen for `retention` drop out of the aggregates
    pub fn new(retention: Duration) -> Self {
        Self {
            entities: DashMap::new(),
            hit_window: RollingWindow::new(HIT_WINDOW),
            memory: Mutex::new(VecDeque::with_capacity(MEMORY_READINGS)),
            retention: chrono::Duration::from_std(retention)
                .unwrap_or_else(|_| chrono::Duration::days(1)),
            records: AtomicU64::new(0),
        }
    }

    pub fn record(&self, sample: &PerformanceSample) {
        if (self.records.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_INTERVAL == 0 {
            self.prune_stale();
        }

        {
            let mut agg = self
                .entities
                .entry(sample.entity_id.clone())
                .or_insert_with(|| EntityAggregate {
                    samples: 0,
                    total_render_ms: 0.0,
                    last_seen: sample.timestamp,
                });
            agg.samples += 1;
            agg.total_render_ms += sample.render_time_ms;
            agg.last_seen = agg.last_seen.max(sample.timestamp);
        }

        self.hit_window.record(sample.cache_hit);

        let mut memory = self.memory.lock();
        if memory.len() == MEMORY_READINGS {
            memory.pop_front();
        }
        memory.push_back(sample.memory_usage_pct);
    }

    /// Entities with a mean render time above `limit_ms`, slowest first
    pub fn slow_entities(&self, limit_ms: f64, max: usize) -> Vec<SlowEntity> {
        self.prune_stale();

        let mut slow: Vec<SlowEntity> = self
            .entities
            .iter()
            .filter_map(|entry| {
                let avg = entry.total_render_ms / entry.samples as f64;
                (avg > limit_ms).then(|| SlowEntity {
                    entity_id: entry.key().clone(),
                    avg_render_time_ms: avg,
                    samples: entry.samples,
                })
            })
            .collect();

        slow.sort_by(|a, b| b.avg_render_time_ms.total_cmp(&a.avg_render_time_ms));
        slow.truncate(max);
        slow
    }

    /// Hit ratio of renders in the current hour window
    pub fn hit_ratio(&self) -> Option<f64> {
        self.hit_window.hit_rate()
    }

    /// Compare the mean of the older half of recent readings to the newer half
    pub fn memory_trend(&self) -> MemoryTrend {
        let memory = self.memory.lock();
        if memory.len() < MIN_TREND_READINGS {
            return MemoryTrend::Unknown;
        }

        let half = memory.len() / 2;
        let older = mean_pct(memory.iter().take(half), half);
        let newer = mean_pct(memory.iter().skip(memory.len() - half), half);

        if newer - older > TREND_DELTA_PCT {
            MemoryTrend::Increasing
        } else if older - newer > TREND_DELTA_PCT {
            MemoryTrend::Decreasing
        } else {
            MemoryTrend::Stable
        }
    }

    /// Entities with at least one sample inside the retention period
    pub fn tracked_entities(&self) -> usize {
        self.entities.len()
    }

    fn prune_stale(&self) {
        let cutoff = Utc::now() - self.retention;
        self.entities.retain(|_, agg| agg.last_seen >= cutoff);
    }
}

fn mean_pct<'a>(values: impl Iterator<Item = &'a u32>, n: usize) -> f64 {
    values.map(|v| f64::from(*v)).sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> AggregateTracker {
        AggregateTracker::new(Duration::from_secs(86400))
    }

    #[tokio::test]
    async fn test_slow_entities_sorted_and_capped() {
        let tracker = tracker();
        for (id, ms) in [("a", 600.0), ("b", 1200.0), ("c", 100.0), ("d", 900.0)] {
            tracker.record(&PerformanceSample::new(id, ms, true, 30));
        }

        let slow = tracker.slow_entities(500.0, 2);
        let ids: Vec<&str> = slow.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);
        assert_eq!(tracker.tracked_entities(), 4);
    }

    #[tokio::test]
    async fn test_slow_entity_uses_running_mean() {
        let tracker = tracker();
        tracker.record(&PerformanceSample::new("a", 900.0, true, 30));
        tracker.record(&PerformanceSample::new("a", 100.0, true, 30));
        assert!(tracker.slow_entities(500.0, 10).is_empty());
    }

    #[tokio::test]
    async fn test_stale_entities_are_pruned() {
        let tracker = tracker();
        let mut old = PerformanceSample::new("old", 2000.0, true, 30);
        old.timestamp = Utc::now() - chrono::Duration::days(2);
        tracker.record(&old);

        assert!(tracker.slow_entities(500.0, 10).is_empty());
        assert_eq!(tracker.tracked_entities(), 0);
    }

    #[tokio::test]
    async fn test_recording_alone_prunes_stale_entities() {
        let tracker = tracker();
        let mut old = PerformanceSample::new("old", 20.0, true, 30);
        old.timestamp = Utc::now() - chrono::Duration::days(2);
        tracker.record(&old);

        for _ in 1..PRUNE_INTERVAL {
            tracker.record(&PerformanceSample::new("live", 20.0, true, 30));
        }
        assert_eq!(tracker.tracked_entities(), 1);
    }

    #[tokio::test]
    async fn test_hit_ratio() {
        let tracker = tracker();
        assert_eq!(tracker.hit_ratio(), None);
        for hit in [true, true, true, false] {
            tracker.record(&PerformanceSample::new("a", 10.0, hit, 30));
        }
        assert!((tracker.hit_ratio().unwrap() - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_memory_trend() {
        let tracker = tracker();
        assert_eq!(tracker.memory_trend(), MemoryTrend::Unknown);

        for pct in [40, 40, 40, 40, 40, 60, 60, 60, 60, 60] {
            tracker.record(&PerformanceSample::new("a", 10.0, true, pct));
        }
        assert_eq!(tracker.memory_trend(), MemoryTrend::Increasing);

        let flat = AggregateTracker::new(Duration::from_secs(86400));
        for _ in 0..12 {
            flat.record(&PerformanceSample::new("a", 10.0, true, 50));
        }
        assert_eq!(flat.memory_trend(), MemoryTrend::Stable);

        let falling = AggregateTracker::new(Duration::from_secs(86400));
        for pct in [90, 90, 90, 90, 90, 30, 30, 30, 30, 30] {
            falling.record(&PerformanceSample::new("a", 10.0, true, pct));
        }
        assert_eq!(falling.memory_trend(), MemoryTrend::Decreasing);
    }
}
