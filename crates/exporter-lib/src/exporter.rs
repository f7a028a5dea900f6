//! Scrape assembly
//!
//! The [`Exporter`] owns the enabled collectors and the registry holding the
//! exporter's own instrumentation. Every scrape runs all collectors
//! concurrently and merges their observations into metric families.

use crate::client::CloudApi;
use crate::collector::{
    Collector, CollectorConfig, FloatingIpCollector, Observation, ServerCollector,
    SshKeyCollector, VolumeCollector,
};
use crate::observability::RequestMetrics;
use anyhow::Result;
use futures::future::join_all;
use prometheus::core::Desc;
use prometheus::proto::{Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Registry pull driver for all resource collectors
pub struct Exporter {
    collectors: Vec<Arc<dyn Collector>>,
    registry: Registry,
    metrics: RequestMetrics,
}

impl Exporter {
    pub fn new(collectors: Vec<Arc<dyn Collector>>, registry: Registry, metrics: RequestMetrics) -> Self {
        Self {
            collectors,
            registry,
            metrics,
        }
    }

    pub fn collectors(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    pub fn request_metrics(&self) -> &RequestMetrics {
        &self.metrics
    }

    /// Descriptors of every enabled collector, in collector order
    pub fn describe(&self) -> Vec<&Desc> {
        self.collectors
            .iter()
            .flat_map(|collector| collector.describe())
            .collect()
    }

    /// Run one scrape cycle and return all metric families sorted by name
    pub async fn gather(&self) -> Vec<MetricFamily> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Observation>();

        join_all(self.collectors.iter().map(|collector| collector.collect(&tx))).await;
        drop(tx);

        let mut samples: HashMap<String, Vec<Metric>> = HashMap::new();
        let mut count = 0usize;
        while let Ok(observation) = rx.try_recv() {
            count += 1;
            samples
                .entry(observation.name().to_string())
                .or_default()
                .push(observation.to_metric());
        }
        debug!(observations = count, collectors = self.collectors.len(), "Scrape complete");

        let mut families = Vec::new();
        for desc in self.describe() {
            if let Some(metrics) = samples.remove(&desc.fq_name) {
                let mut family = MetricFamily::default();
                family.set_name(desc.fq_name.clone());
                family.set_help(desc.help.clone());
                family.set_field_type(MetricType::GAUGE);
                family.set_metric(metrics.into());
                families.push(family);
            }
        }

        families.extend(self.registry.gather());
        families.sort_by(|a, b| a.get_name().cmp(b.get_name()));
        families
    }

    /// Run one scrape cycle and encode it in the Prometheus text format
    pub async fn render(&self) -> prometheus::Result<String> {
        let families = self.gather().await;
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;

        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Builder for the exporter and its collectors
pub struct ExporterBuilder {
    client: Option<Arc<dyn CloudApi>>,
    registry: Option<Registry>,
    config: CollectorConfig,
    servers: bool,
    volumes: bool,
    floating_ips: bool,
    ssh_keys: bool,
}

impl ExporterBuilder {
    /// Create a new builder with every collector enabled
    pub fn new() -> Self {
        Self {
            client: None,
            registry: None,
            config: CollectorConfig::default(),
            servers: true,
            volumes: true,
            floating_ips: true,
            ssh_keys: true,
        }
    }

    /// Set the API client
    pub fn client(mut self, client: Arc<dyn CloudApi>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use an existing registry for the request metrics
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the fetch timeout of every collector
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn servers(mut self, enabled: bool) -> Self {
        self.servers = enabled;
        self
    }

    pub fn volumes(mut self, enabled: bool) -> Self {
        self.volumes = enabled;
        self
    }

    pub fn floating_ips(mut self, enabled: bool) -> Self {
        self.floating_ips = enabled;
        self
    }

    pub fn ssh_keys(mut self, enabled: bool) -> Self {
        self.ssh_keys = enabled;
        self
    }

    /// Build the exporter
    pub fn build(self) -> Result<Exporter> {
        let client = self
            .client
            .ok_or_else(|| anyhow::anyhow!("Client is required"))?;
        let registry = self.registry.unwrap_or_else(Registry::new);
        let metrics = RequestMetrics::new(&registry)?;

        let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();
        if self.servers {
            collectors.push(Arc::new(ServerCollector::new(
                client.clone(),
                metrics.clone(),
                self.config.clone(),
            )?));
        }
        if self.volumes {
            collectors.push(Arc::new(VolumeCollector::new(
                client.clone(),
                metrics.clone(),
                self.config.clone(),
            )?));
        }
        if self.floating_ips {
            collectors.push(Arc::new(FloatingIpCollector::new(
                client.clone(),
                metrics.clone(),
                self.config.clone(),
            )?));
        }
        if self.ssh_keys {
            collectors.push(Arc::new(SshKeyCollector::new(
                client,
                metrics.clone(),
                self.config,
            )?));
        }

        Ok(Exporter::new(collectors, registry, metrics))
    }
}

impl Default for ExporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
