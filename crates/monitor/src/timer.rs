//! Timed render reporting

use crate::alerts::PerformanceAlert;
use crate::monitor::PerformanceMonitor;
use alumni_cache::CacheableEntity;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::Instant;
use tracing::{Instrument, Span};

/// Handle timing one render. Reports through `record_render` on `finish`;
/// dropping it unfinished records nothing.
pub struct RenderTimer<T> {
    monitor: PerformanceMonitor<T>,
    entity_id: String,
    span: Span,
    start_time: Instant,
}

impl<T: CacheableEntity> RenderTimer<T> {
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub async fn finish(self, cache_hit: bool, memory_usage_pct: u32) -> Vec<PerformanceAlert> {
        let render_time_ms = self.elapsed_ms();
        self.monitor
            .record_render(&self.entity_id, render_time_ms, cache_hit, memory_usage_pct)
            .instrument(self.span)
            .await
    }
}

impl<T: CacheableEntity> PerformanceMonitor<T> {
    pub fn start_render(&self, entity_id: &str) -> RenderTimer<T> {
        RenderTimer {
            monitor: self.clone(),
            entity_id: entity_id.to_string(),
            span: tracing::info_span!("template_render", entity_id),
            start_time: Instant::now(),
        }
    }

    /// Fetch an entity through the cache and report the render.
    ///
    /// A hit is a fetch that never invoked `producer`. Producer errors are
    /// returned unchanged and nothing is recorded.
    pub async fn render<E, F, Fut>(
        &self,
        entity_id: &str,
        memory_usage_pct: u32,
        producer: F,
    ) -> Result<(T, Vec<PerformanceAlert>), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let timer = self.start_render(entity_id);
        let produced = AtomicBool::new(false);

        let entity = self
            .cache()
            .get_or_compute(entity_id, || {
                produced.store(true, Ordering::Relaxed);
                producer()
            })
            .instrument(timer.span().clone())
            .await?;

        let cache_hit = !produced.load(Ordering::Relaxed);
        let alerts = timer.finish(cache_hit, memory_usage_pct).await;
        Ok((entity, alerts))
    }
}
