#![allow(dead_code)]

use alumni_cache::{CacheableEntity, TieredCache};
use alumni_monitor::{
    EntityRepository, MemoryTimeSeries, MonitorConfig, MonitorError, PerformanceMonitor,
    PerformanceSample, RepositoryResult, TimeSeriesStore,
};
use alumni_utils::tracing::{writer_subscriber, Level};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    pub usage_count: u64,
    pub active: bool,
    /// Seconds since epoch of the last render
    pub last_used: u64,
}

impl CacheableEntity for Template {
    fn cache_id(&self) -> String {
        self.id.to_string()
    }
}

pub fn template(id: u64, usage_count: u64, last_used: u64) -> Template {
    Template {
        id,
        name: format!("Template {id}"),
        usage_count,
        active: true,
        last_used,
    }
}

/// Repository over a fixed list, optionally failing every query
#[derive(Default)]
pub struct InMemoryRepository {
    pub templates: Vec<Template>,
    pub fail: AtomicBool,
}

impl InMemoryRepository {
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            templates,
            fail: AtomicBool::new(false),
        }
    }

    fn check(&self) -> RepositoryResult<()> {
        if self.fail.load(Ordering::Relaxed) {
            Err("database offline".into())
        } else {
            Ok(())
        }
    }

    fn active(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter().filter(|t| t.active)
    }
}

#[async_trait]
impl EntityRepository<Template> for InMemoryRepository {
    async fn most_used_active(&self, limit: usize) -> RepositoryResult<Vec<Template>> {
        self.check()?;
        let mut active: Vec<Template> = self.active().cloned().collect();
        active.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        active.truncate(limit);
        Ok(active)
    }

    async fn frequently_used_active(
        &self,
        min_usage: u64,
        limit: usize,
    ) -> RepositoryResult<Vec<Template>> {
        self.check()?;
        let mut frequent: Vec<Template> = self
            .active()
            .filter(|t| t.usage_count > min_usage)
            .cloned()
            .collect();
        frequent.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        frequent.truncate(limit);
        Ok(frequent)
    }

    async fn count_active(&self) -> RepositoryResult<usize> {
        self.check()?;
        Ok(self.active().count())
    }
}

/// Time series that rejects every call
pub struct OfflineSeries;

#[async_trait]
impl TimeSeriesStore for OfflineSeries {
    async fn append(&self, _key: &str, _sample: PerformanceSample) -> alumni_monitor::Result<()> {
        Err(offline("append"))
    }

    async fn read_recent(
        &self,
        _key: &str,
        _limit: usize,
    ) -> alumni_monitor::Result<Vec<PerformanceSample>> {
        Err(offline("read_recent"))
    }

    async fn set_expiry(&self, _key: &str, _ttl: Duration) -> alumni_monitor::Result<()> {
        Err(offline("set_expiry"))
    }
}

fn offline(operation: &'static str) -> MonitorError {
    MonitorError::Series {
        operation,
        message: "connection refused".to_string(),
    }
}

pub struct Fixture {
    pub monitor: PerformanceMonitor<Template>,
    pub cache: TieredCache,
    pub series: MemoryTimeSeries,
    pub repository: Arc<InMemoryRepository>,
}

pub fn fixture(templates: Vec<Template>) -> Fixture {
    let cache = TieredCache::in_memory();
    let series = MemoryTimeSeries::default();
    let repository = Arc::new(InMemoryRepository::new(templates));
    let monitor = PerformanceMonitor::new(
        cache.clone(),
        Arc::new(series.clone()),
        repository.clone(),
        MonitorConfig::default(),
    )
    .unwrap();

    Fixture {
        monitor,
        cache,
        series,
        repository,
    }
}

/// Shared buffer a fmt layer writes into
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's logs into a buffer until the guard drops
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = writer_subscriber(Level::DEBUG, move || writer.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
