//! Resource collectors
//!
//! One collector per resource type. Each scrape runs the same cycle:
//! fetch the complete resource list under a deadline, map every record to
//! gauge observations, and account failures and cycle duration in the
//! shared [`RequestMetrics`].

mod floating_ip;
mod server;
mod ssh_key;
mod volume;


pub use floating_ip::FloatingIpCollector;
pub use server::ServerCollector;
pub use ssh_key::SshKeyCollector;
pub use volume::VolumeCollector;

use crate::client::ApiError;
use crate::observability::RequestMetrics;
use async_trait::async_trait;
use prometheus::core::Desc;
use prometheus::proto::{Gauge, LabelPair, Metric};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Channel end a collector writes its observations to
pub type ObservationSender = mpsc::UnboundedSender<Observation>;

/// Per-collector settings
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Deadline for fetching one resource list (default: 5 seconds)
    pub timeout: Duration,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// Trait implemented by every resource type collector
#[async_trait]
pub trait Collector: Send + Sync {
    /// Collector name used as the `collector` label of request metrics
    fn name(&self) -> &'static str;

    /// All descriptors this collector can emit
    fn describe(&self) -> Vec<&Desc>;

    /// Run one collection cycle, writing observations to `tx`
    async fn collect(&self, tx: &ObservationSender);
}

/// One gauge sample with label values matching its descriptor
#[derive(Debug, Clone)]
pub struct Observation {
    desc: Arc<Desc>,
    value: f64,
    label_values: Vec<String>,
}

impl Observation {
    /// Create an observation, rejecting label values that do not match the
    /// descriptor's label names
    pub fn new(desc: &Arc<Desc>, value: f64, label_values: Vec<String>) -> prometheus::Result<Self> {
        if desc.variable_labels.len() != label_values.len() {
            return Err(prometheus::Error::InconsistentCardinality {
                expect: desc.variable_labels.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            desc: Arc::clone(desc),
            value,
            label_values,
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label value for `name`, if the descriptor declares it
    pub fn label(&self, name: &str) -> Option<&str> {
        self.desc
            .variable_labels
            .iter()
            .position(|label| label == name)
            .map(|i| self.label_values[i].as_str())
    }

    /// Convert into a protobuf gauge sample
    pub fn to_metric(&self) -> Metric {
        let mut labels: Vec<LabelPair> = self.desc.const_label_pairs.clone();
        for (name, value) in self.desc.variable_labels.iter().zip(&self.label_values) {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.clone());
            labels.push(pair);
        }

        let mut gauge = Gauge::default();
        gauge.set_value(self.value);

        let mut metric = Metric::default();
        metric.set_label(labels.into());
        metric.set_gauge(gauge);
        metric
    }
}

/// Build a gauge descriptor without constant labels
pub(crate) fn gauge_desc(name: &str, help: &str, labels: &[&str]) -> prometheus::Result<Arc<Desc>> {
    let desc = Desc::new(
        name.to_string(),
        help.to_string(),
        labels.iter().map(|label| label.to_string()).collect(),
        HashMap::new(),
    )?;
    Ok(Arc::new(desc))
}

/// Send one observation; label mismatches are logged and dropped
pub(crate) fn emit(tx: &ObservationSender, desc: &Arc<Desc>, value: f64, label_values: &[String]) {
    match Observation::new(desc, value, label_values.to_vec()) {
        Ok(observation) => {
            if tx.send(observation).is_err() {
                debug!(metric = %desc.fq_name, "Observation receiver dropped");
            }
        }
        Err(e) => {
            error!(metric = %desc.fq_name, error = %e, "Invalid observation");
        }
    }
}

/// Errors that abort a whole collection cycle
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Await `fetch`, failing with [`FetchError::Timeout`] once `timeout` elapsed
pub async fn fetch_with_deadline<T, F>(timeout: Duration, fetch: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result.map_err(FetchError::from),
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}

/// A single metric value that could not be derived
#[derive(Debug, thiserror::Error)]
#[error("invalid decimal {value:?}: {source}")]
pub struct ValueParseError {
    value: String,
    source: std::num::ParseFloatError,
}

/// Parse a decimal price string as sent by the API
pub fn parse_price(value: &str) -> Result<f64, ValueParseError> {
    value.parse::<f64>().map_err(|source| ValueParseError {
        value: value.to_string(),
        source,
    })
}

/// Bookkeeping for one collection cycle
///
/// Records the elapsed time into the duration histogram when dropped, so
/// every exit path observes exactly once.
pub(crate) struct Cycle<'a> {
    collector: &'static str,
    metrics: &'a RequestMetrics,
    start: Instant,
}

impl<'a> Cycle<'a> {
    pub(crate) fn start(collector: &'static str, metrics: &'a RequestMetrics) -> Self {
        Self {
            collector,
            metrics,
            start: Instant::now(),
        }
    }

    /// Fetch the resource list, logging and counting a failure
    pub(crate) async fn fetch<T, F>(&self, timeout: Duration, resource: &str, fetch: F) -> Option<Vec<T>>
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        match fetch_with_deadline(timeout, fetch).await {
            Ok(items) => {
                debug!(collector = self.collector, count = items.len(), "Fetched {}", resource);
                Some(items)
            }
            Err(e) => {
                error!(collector = self.collector, error = %e, "Failed to fetch {}", resource);
                self.metrics.inc_failure(self.collector);
                None
            }
        }
    }

    /// Count a failure that only affects a single value
    pub(crate) fn value_failed(&self) {
        self.metrics.inc_failure(self.collector);
    }
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        debug!(
            collector = self.collector,
            duration_ms = elapsed.as_millis() as u64,
            "Processed collector"
        );
        self.metrics
            .observe_duration(self.collector, elapsed.as_secs_f64());
    }
}
