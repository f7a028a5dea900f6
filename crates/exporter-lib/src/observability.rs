//! Self-instrumentation of the exporter
//!
//! Provides:
//! - Per-collector request failure counter
//! - Per-collector collection duration histogram
//! - Build information gauge

use prometheus::{GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Histogram buckets for collection durations (in seconds)
const DURATION_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Shared failure and duration instruments, keyed by collector name
///
/// Clones share the same underlying series. Updates are atomic, so
/// collectors running concurrently never lose increments.
#[derive(Clone)]
pub struct RequestMetrics {
    failures: IntCounterVec,
    duration: HistogramVec,
}

impl RequestMetrics {
    /// Create the instruments and register them with `registry`
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        let failures = IntCounterVec::new(
            Opts::new(
                "hcloud_request_failures_total",
                "Total number of failed requests to the cloud API per collector",
            ),
            &["collector"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "hcloud_request_duration_seconds",
                "Time spent collecting metrics per collector",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["collector"],
        )?;

        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self { failures, duration })
    }

    /// Expose a zero failure count for `collector` before anything failed
    pub fn init(&self, collector: &str) {
        self.failures.with_label_values(&[collector]).inc_by(0);
    }

    /// Increment the failure counter of `collector`
    pub fn inc_failure(&self, collector: &str) {
        self.failures.with_label_values(&[collector]).inc();
    }

    /// Record a collection duration observation
    pub fn observe_duration(&self, collector: &str, duration_secs: f64) {
        self.duration
            .with_label_values(&[collector])
            .observe(duration_secs);
    }

    /// Current failure count of `collector`
    pub fn failures(&self, collector: &str) -> u64 {
        self.failures.with_label_values(&[collector]).get()
    }

    /// Number of duration observations recorded for `collector`
    pub fn duration_count(&self, collector: &str) -> u64 {
        self.duration
            .with_label_values(&[collector])
            .get_sample_count()
    }
}

/// Build information exposed as a constant gauge
#[derive(Clone)]
pub struct BuildInfo {
    info: GaugeVec,
}

impl BuildInfo {
    pub fn new(registry: &Registry, version: &str) -> prometheus::Result<Self> {
        let info = GaugeVec::new(
            Opts::new(
                "hcloud_exporter_build_info",
                "A metric with a constant '1' value labeled by version",
            ),
            &["version"],
        )?;
        registry.register(Box::new(info.clone()))?;
        info.with_label_values(&[version]).set(1.0);

        Ok(Self { info })
    }

    pub fn version_value(&self, version: &str) -> f64 {
        self.info.with_label_values(&[version]).get()
    }
}
