//! Render performance monitoring for alumni templates
//!
//! Records one sample per render into a time series, raises threshold
//! alerts, derives per-template statistics and system-wide aggregates, and
//! drives warm-up of the tiered template cache.

pub mod alerts;
pub mod analyzer;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod monitor;
pub mod repository;
pub mod sample;
pub mod series;
pub mod stats;
pub mod timer;
pub mod ttl;

pub use alerts::{check_thresholds, PerformanceAlert};
pub use analyzer::{AggregateTracker, MemoryTrend, SlowEntity};
pub use config::{AlertThresholds, MonitorConfig, RecommendationThresholds};
pub use errors::{BoxError, MonitorError, Result};
pub use monitor::{OptimizationReport, PerformanceMonitor, SystemMetrics};
pub use repository::{EntityRepository, RepositoryResult};
pub use sample::{series_key, PerformanceSample};
pub use series::{MemoryTimeSeries, TimeSeriesStore};
pub use stats::PerformanceStats;
pub use timer::RenderTimer;
pub use ttl::{NoopTtlAdvisor, TtlAdjustment, TtlAdvisor};
