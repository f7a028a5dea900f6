//! SSH key metrics collection

use super::{emit, gauge_desc, Collector, CollectorConfig, Cycle, ObservationSender};
use crate::client::CloudApi;
use crate::observability::RequestMetrics;
use async_trait::async_trait;
use prometheus::core::Desc;
use std::sync::Arc;

const NAME: &str = "ssh_key";

/// Collects the SSH keys registered in the project
pub struct SshKeyCollector {
    client: Arc<dyn CloudApi>,
    metrics: RequestMetrics,
    config: CollectorConfig,

    key: Arc<Desc>,
}

impl SshKeyCollector {
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

            key: gauge_desc(
                "hcloud_ssh_key",
                "Information about SSH keys in your Hetzner Cloud project",
                &["id", "name", "fingerprint"],
            )?,
        })
    }
}

#[async_trait]
impl Collector for SshKeyCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> Vec<&Desc> {
        vec![&*self.key]
    }

    async fn collect(&self, tx: &ObservationSender) {
        let cycle = Cycle::start(NAME, &self.metrics);

        let Some(keys) = cycle
            .fetch(self.config.timeout, "SSH keys", self.client.ssh_keys())
            .await
        else {
            return;
        };

        for key in &keys {
            let labels = [key.id.to_string(), key.name.clone(), key.fingerprint.clone()];
            emit(tx, &self.key, 1.0, &labels);
        }
    }
}
