//! In-process time-series store

use super::TimeSeriesStore;
use crate::errors::Result;
use crate::sample::PerformanceSample;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Longest series kept per entity
pub const DEFAULT_MAX_SAMPLES: usize = 1000;
/// Appends between sweeps of expired series
const PURGE_INTERVAL: u64 = 1024;

#[derive(Debug, Default)]
struct Series {
    samples: VecDeque<PerformanceSample>,
    expires_at: Option<Instant>,
}

impl Series {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// DashMap-backed series with a length cap and lazy expiry
#[derive(Debug, Clone)]
pub struct MemoryTimeSeries {
    series: Arc<DashMap<String, Series>>,
    max_samples: usize,
    appends: Arc<AtomicU64>,
}

impl Default for MemoryTimeSeries {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl MemoryTimeSeries {
    pub fn new(max_samples: usize) -> Self {
        Self {
            series: Arc::new(DashMap::new()),
            max_samples: max_samples.max(1),
            appends: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Drop every expired series, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.series.len();
        self.series.retain(|_, s| !s.is_expired(now));
        before.saturating_sub(self.series.len())
    }

    /// Number of live series
    pub fn series_count(&self) -> usize {
        let now = Instant::now();
        self.series.iter().filter(|s| !s.is_expired(now)).count()
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryTimeSeries {
    async fn append(&self, series_key: &str, sample: PerformanceSample) -> Result<()> {
        // Series written but never read would otherwise stay forever
        if (self.appends.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_INTERVAL == 0 {
            self.purge_expired();
        }

        let now = Instant::now();
        let mut series = self.series.entry(series_key.to_string()).or_default();
        if series.is_expired(now) {
            *series = Series::default();
        }
        series.samples.push_front(sample);
        series.samples.truncate(self.max_samples);
        Ok(())
    }

    async fn read_recent(&self, series_key: &str, limit: usize) -> Result<Vec<PerformanceSample>> {
        let now = Instant::now();
        if let Some(series) = self.series.get(series_key) {
            if !series.is_expired(now) {
                return Ok(series.samples.iter().take(limit).cloned().collect());
            }
        } else {
            return Ok(Vec::new());
        }

        self.series.remove_if(series_key, |_, s| s.is_expired(now));
        Ok(Vec::new())
    }

    async fn set_expiry(&self, series_key: &str, ttl: Duration) -> Result<()> {
        if let Some(mut series) = self.series.get_mut(series_key) {
            series.expires_at = Instant::now().checked_add(ttl);
        }
        Ok(())
    }
}
