//! Hetzner Cloud exporter daemon
//!
//! Configuration, logging setup and the HTTP surface around
//! [`exporter_lib::Exporter`].

pub mod api;
pub mod config;
pub mod logging;
pub mod output;

use anyhow::{Context, Result};
use exporter_lib::{BuildInfo, Exporter, ExporterBuilder, HttpClient};
use prometheus::Registry;
use std::sync::Arc;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the exporter described by `config`, including build info and
/// process instrumentation
pub fn build_exporter(config: &config::ExporterConfig) -> Result<Exporter> {
    let client = HttpClient::new(&config.api_endpoint, config.token.clone())
        .context("Failed to create API client")?;

    let registry = Registry::new();
    BuildInfo::new(&registry, VERSION)?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    ExporterBuilder::new()
        .client(Arc::new(client))
        .registry(registry)
        .timeout(config.request_timeout())
        .servers(config.collector_servers)
        .volumes(config.collector_volumes)
        .floating_ips(config.collector_floating_ips)
        .ssh_keys(config.collector_ssh_keys)
        .build()
}
