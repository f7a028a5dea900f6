//! Floating IP metrics collection

use super::{emit, gauge_desc, Collector, CollectorConfig, Cycle, ObservationSender};
use crate::client::CloudApi;
use crate::observability::RequestMetrics;
use async_trait::async_trait;
use prometheus::core::Desc;
use std::sync::Arc;

const NAME: &str = "floating_ip";

const LABELS: &[&str] = &["id", "name", "server", "location", "type", "ip"];

/// Collects metrics about floating IPs
pub struct FloatingIpCollector {
    client: Arc<dyn CloudApi>,
    metrics: RequestMetrics,
    config: CollectorConfig,

    active: Arc<Desc>,
    blocked: Arc<Desc>,
    created: Arc<Desc>,
}

impl FloatingIpCollector {
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

            active: gauge_desc(
                "hcloud_floating_ip_active",
                "If 1 the floating IP is assigned to a server, 0 otherwise",
                LABELS,
            )?,
            blocked: gauge_desc(
                "hcloud_floating_ip_blocked",
                "If 1 the floating IP is blocked, 0 otherwise",
                LABELS,
            )?,
            created: gauge_desc(
                "hcloud_floating_ip_created_timestamp",
                "Timestamp when the floating IP have been created",
                LABELS,
            )?,
        })
    }
}

#[async_trait]
impl Collector for FloatingIpCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> Vec<&Desc> {
        vec![&*self.active, &*self.blocked, &*self.created]
    }

    async fn collect(&self, tx: &ObservationSender) {
        let cycle = Cycle::start(NAME, &self.metrics);

        let Some(floating_ips) = cycle
            .fetch(self.config.timeout, "floating IPs", self.client.floating_ips())
            .await
        else {
            return;
        };

        for floating_ip in &floating_ips {
            let labels = vec![
                floating_ip.id.to_string(),
                floating_ip.name.clone(),
                floating_ip
                    .server
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
                floating_ip.home_location.name.clone(),
                floating_ip.ip_type.clone(),
                floating_ip.ip.clone(),
            ];

            let active = if floating_ip.server.is_some() { 1.0 } else { 0.0 };
            let blocked = if floating_ip.blocked { 1.0 } else { 0.0 };

            emit(tx, &self.active, active, &labels);
            emit(tx, &self.blocked, blocked, &labels);
            emit(tx, &self.created, floating_ip.created.timestamp() as f64, &labels);
        }
    }
}
