//! Server metrics collection

use super::{emit, gauge_desc, parse_price, Collector, CollectorConfig, Cycle, ObservationSender};
use crate::client::CloudApi;
use crate::models::{Price, PriceLookup, Server};
use crate::observability::RequestMetrics;
use async_trait::async_trait;
use prometheus::core::Desc;
use std::sync::Arc;
use tracing::{debug, error};

const NAME: &str = "server";

const BASE_LABELS: &[&str] = &["id", "name", "datacenter", "network"];
const PRICING_LABELS: &[&str] = &["id", "name", "datacenter", "network", "vat"];

const MIB: f64 = 1024.0 * 1024.0;

/// Collects metrics about servers
pub struct ServerCollector {
    client: Arc<dyn CloudApi>,
    metrics: RequestMetrics,
    config: CollectorConfig,

    running: Arc<Desc>,
    created: Arc<Desc>,
    included_traffic: Arc<Desc>,
    outgoing_traffic: Arc<Desc>,
    ingoing_traffic: Arc<Desc>,
    cores: Arc<Desc>,
    memory: Arc<Desc>,
    disk: Arc<Desc>,
    backup: Arc<Desc>,
    price_hourly: Arc<Desc>,
    price_monthly: Arc<Desc>,
}

impl ServerCollector {
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

            running: gauge_desc(
                "hcloud_server_running",
                "If 1 the server is running, 0 otherwise",
                BASE_LABELS,
            )?,
            created: gauge_desc(
                "hcloud_server_created_timestamp",
                "Timestamp when the server have been created",
                BASE_LABELS,
            )?,
            included_traffic: gauge_desc(
                "hcloud_server_included_traffic_bytes",
                "Included traffic for the server in bytes",
                BASE_LABELS,
            )?,
            outgoing_traffic: gauge_desc(
                "hcloud_server_outgoing_traffic_bytes",
                "Outgoing traffic from the server in bytes",
                BASE_LABELS,
            )?,
            ingoing_traffic: gauge_desc(
                "hcloud_server_incoming_traffic_bytes",
                "Ingoing traffic to the server in bytes",
                BASE_LABELS,
            )?,
            cores: gauge_desc("hcloud_server_cores", "Server number of cores", BASE_LABELS)?,
            memory: gauge_desc(
                "hcloud_server_memory_bytes",
                "Server memory in bytes",
                BASE_LABELS,
            )?,
            disk: gauge_desc("hcloud_server_disk_bytes", "Server disk in bytes", BASE_LABELS)?,
            backup: gauge_desc(
                "hcloud_server_backup",
                "If 1 server backups are enabled, 0 otherwise",
                BASE_LABELS,
            )?,
            price_hourly: gauge_desc(
                "hcloud_server_price_hourly",
                "Price of the server billed hourly in €",
                PRICING_LABELS,
            )?,
            price_monthly: gauge_desc(
                "hcloud_server_price_monthly",
                "Price of the server billed monthly in €",
                PRICING_LABELS,
            )?,
        })
    }

    fn collect_server(&self, cycle: &Cycle<'_>, server: &Server, tx: &ObservationSender) {
        let network = server.network().to_string();
        let attachments = server.attachments().len();
        if attachments > 1 {
            debug!(
                collector = NAME,
                server = %server.name,
                network = %network,
                attachments = attachments,
                "Server has several private networks, labeling with the first"
            );
        }

        let labels = vec![
            server.id.to_string(),
            server.name.clone(),
            server.datacenter.name.clone(),
            network,
        ];

        let running = if server.is_running() { 1.0 } else { 0.0 };
        let backup = if server.backup_enabled() { 1.0 } else { 0.0 };

        emit(tx, &self.running, running, &labels);
        emit(tx, &self.created, server.created.timestamp() as f64, &labels);
        emit(
            tx,
            &self.included_traffic,
            server.included_traffic.unwrap_or_default() as f64,
            &labels,
        );
        emit(
            tx,
            &self.outgoing_traffic,
            server.outgoing_traffic.unwrap_or_default() as f64,
            &labels,
        );
        emit(
            tx,
            &self.ingoing_traffic,
            server.ingoing_traffic.unwrap_or_default() as f64,
            &labels,
        );
        emit(tx, &self.cores, server.server_type.cores as f64, &labels);
        emit(tx, &self.memory, server.server_type.memory * MIB, &labels);
        emit(tx, &self.disk, server.server_type.disk as f64 * MIB, &labels);
        emit(tx, &self.backup, backup, &labels);

        let lookup = server.price_lookup();
        match &lookup {
            PriceLookup::Missing => {
                debug!(collector = NAME, server = %server.name, "Server type has no price list")
            }
            PriceLookup::Empty => {
                debug!(collector = NAME, server = %server.name, "Server type price list is empty")
            }
            PriceLookup::NoMatch => debug!(
                collector = NAME,
                server = %server.name,
                location = %server.datacenter.location.name,
                "No price quoted for server location"
            ),
            PriceLookup::Matched(_) => {}
        }

        let pricing = PricingLabels::new(labels);
        for tier in lookup.tiers() {
            self.emit_price(cycle, server, tx, &self.price_hourly, &tier.price_hourly, &pricing);
            self.emit_price(cycle, server, tx, &self.price_monthly, &tier.price_monthly, &pricing);
        }
    }

    /// Emit the net and gross value of one price independently
    fn emit_price(
        &self,
        cycle: &Cycle<'_>,
        server: &Server,
        tx: &ObservationSender,
        desc: &Arc<Desc>,
        price: &Price,
        pricing: &PricingLabels,
    ) {
        let values = [
            ("net", &price.net, &pricing.net),
            ("gross", &price.gross, &pricing.gross),
        ];

        for (vat, raw, labels) in values {
            match parse_price(raw) {
                Ok(value) => emit(tx, desc, value, labels),
                Err(e) => {
                    error!(
                        collector = NAME,
                        name = %server.name,
                        metric = %desc.fq_name,
                        vat = vat,
                        error = %e,
                        "Failed to parse server type costs"
                    );
                    cycle.value_failed();
                }
            }
        }
    }
}

/// Base labels extended by the `vat` discriminator
struct PricingLabels {
    net: Vec<String>,
    gross: Vec<String>,
}

impl PricingLabels {
    fn new(base: Vec<String>) -> Self {
        let mut net = base.clone();
        net.push("net".to_string());
        let mut gross = base;
        gross.push("gross".to_string());
        Self { net, gross }
    }
}

#[async_trait]
impl Collector for ServerCollector {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> Vec<&Desc> {
        vec![
            &*self.running,
            &*self.created,
            &*self.included_traffic,
            &*self.outgoing_traffic,
            &*self.ingoing_traffic,
            &*self.cores,
            &*self.memory,
            &*self.disk,
            &*self.backup,
            &*self.price_hourly,
            &*self.price_monthly,
        ]
    }

    async fn collect(&self, tx: &ObservationSender) {
        let cycle = Cycle::start(NAME, &self.metrics);

        let Some(servers) = cycle
            .fetch(self.config.timeout, "servers", self.client.servers())
            .await
        else {
            return;
        };

        for server in &servers {
            self.collect_server(&cycle, server, tx);
        }
    }
}
