//! Prometheus metrics for template renders

use crate::sample::PerformanceSample;
use prometheus::{CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};

/// Prometheus metrics fed by `record_render`
pub struct MetricsCollector {
    /// Renders by cache outcome
    renders: CounterVec,
    /// Alerts by kind
    alerts: CounterVec,
    /// Render duration histogram
    render_duration: Histogram,
    /// Memory usage of the most recent render
    memory_usage: Gauge,
}

impl MetricsCollector {
    /// Register every metric with `registry`
    pub fn init(registry: &Registry) -> Result<Self, prometheus::Error> {
        let renders = CounterVec::new(
            Opts::new(
                "alumni_template_renders_total",
                "Total number of template renders",
            ),
            &["result"],
        )?;
        registry.register(Box::new(renders.clone()))?;

        let alerts = CounterVec::new(
            Opts::new(
                "alumni_template_alerts_total",
                "Total number of render performance alerts",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(alerts.clone()))?;

        let render_duration = Histogram::with_opts(
            HistogramOpts::new(
                "alumni_template_render_seconds",
                "Template render duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(render_duration.clone()))?;

        let memory_usage = Gauge::with_opts(Opts::new(
            "alumni_template_memory_usage_percent",
            "Memory usage reported by the most recent render",
        ))?;
        registry.register(Box::new(memory_usage.clone()))?;

        Ok(Self {
            renders,
            alerts,
            render_duration,
            memory_usage,
        })
    }

    pub fn record_sample(&self, sample: &PerformanceSample) {
        let result = if sample.cache_hit { "hit" } else { "miss" };
        self.renders.with_label_values(&[result]).inc();
        self.render_duration.observe(sample.render_time_ms / 1000.0);
        self.memory_usage.set(f64::from(sample.memory_usage_pct));
    }

    pub fn record_alert(&self, kind: &str) {
        self.alerts.with_label_values(&[kind]).inc();
    }
}
