//! Time-series append store for performance samples
//!
//! The monitor writes only to this keyspace; it never touches cache tiers
//! directly.

mod memory;

pub use memory::MemoryTimeSeries;

use crate::errors::Result;
use crate::sample::PerformanceSample;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Prepend a sample so the series stays newest first
    async fn append(&self, series_key: &str, sample: PerformanceSample) -> Result<()>;

    /// Up to `limit` samples, newest first. An unknown series is empty.
    async fn read_recent(&self, series_key: &str, limit: usize) -> Result<Vec<PerformanceSample>>;

    /// Expire the whole series `ttl` from now
    async fn set_expiry(&self, series_key: &str, ttl: Duration) -> Result<()>;
}
