//! Volume metrics collection

use super::{emit, gauge_desc, Collector, CollectorConfig, Cycle, ObservationSender};
use crate::client::CloudApi;
use crate::observability::RequestMetrics;
use async_trait::async_trait;
use prometheus::core::Desc;
use std::sync::Arc;

const NAME: &str = "volume";

const LABELS: &[&str] = &["id", "name", "server", "location"];

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Collects metrics about volumes
pub struct VolumeCollector {
    client: Arc<dyn CloudApi>,
    metrics: RequestMetrics,
    config: CollectorConfig,

    status: Arc<Desc>,
    size: Arc<Desc>,
    protection: Arc<Desc>,
    created: Arc<Desc>,
}

impl VolumeCollector {
    pub fn new(
        client: Arc<dyn CloudApi>,
        metrics: RequestMetrics,
        config: CollectorConfig,
    ) -> prometheus::Result<Self> {
        metrics.init(NAME);

        Ok(Self {
            client,
            metrics,
            config,

            status: gauge_desc(
                "hcloud_volume_status",
                "If 1 the volume is available, 0 otherwise",
                LABELS,
            )?,
            size: gauge_desc("hcloud_volume_size_bytes", "Size of the volume in bytes", LABELS)?,
            protection: gauge_desc(
                "hcloud_volume_protection",
                "If 1 the volume is protected against deletion, 0 otherwise",
                LABELS,
            )?,
            created: gauge_desc(
                "hcloud_volume_created_timestamp",
                "Timestamp when the volume have been created",
                LABELS,
            )?,
        })
    }
}

#[async_trait]
impl Collector for VolumeCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> Vec<&Desc> {
        vec![&*self.status, &*self.size, &*self.protection, &*self.created]
    }

    async fn collect(&self, tx: &ObservationSender) {
        let cycle = Cycle::start(NAME, &self.metrics);

        let Some(volumes) = cycle
            .fetch(self.config.timeout, "volumes", self.client.volumes())
            .await
        else {
            return;
        };

        for volume in &volumes {
            let labels = vec![
                volume.id.to_string(),
                volume.name.clone(),
                volume.server.map(|id| id.to_string()).unwrap_or_default(),
                volume.location.name.clone(),
            ];

            let available = if volume.status == "available" { 1.0 } else { 0.0 };
            let protected = if volume.protection.delete { 1.0 } else { 0.0 };

            emit(tx, &self.status, available, &labels);
            emit(tx, &self.size, volume.size as f64 * GIB, &labels);
            emit(tx, &self.protection, protected, &labels);
            emit(tx, &self.created, volume.created.timestamp() as f64, &labels);
        }
    }
}
