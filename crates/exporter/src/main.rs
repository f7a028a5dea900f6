//! hcloud-exporter - Prometheus exporter for Hetzner Cloud
//!
//! Serves gauges about servers, volumes, floating IPs and SSH keys of one
//! cloud project. Every scrape queries the cloud API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use hcloud_exporter::{
    api::{self, AppState},
    build_exporter,
    config::ExporterConfig,
    logging,
    output::{self, MetricDoc, OutputFormat},
    VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Prometheus exporter for Hetzner Cloud
#[derive(Parser)]
#[command(name = "hcloud-exporter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (environment variables take precedence)
    #[arg(long, short, env = "HCLOUD_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve metrics over HTTP (default)
    Server,

    /// Print the metrics this exporter provides
    Metrics {
        /// Output format
        #[arg(long, short, default_value = "table")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ExporterConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Server) {
        Commands::Server => run_server(config).await,
        Commands::Metrics { format } => print_metrics(&config, format),
    }
}

async fn run_server(config: ExporterConfig) -> Result<()> {
    logging::init_tracing(&config.log_level, config.log_json)?;
    config.validate()?;

    info!(version = VERSION, "Starting hcloud-exporter");
    info!(
        endpoint = %config.api_endpoint,
        timeout_secs = config.request_timeout_secs,
        servers = config.collector_servers,
        volumes = config.collector_volumes,
        floating_ips = config.collector_floating_ips,
        ssh_keys = config.collector_ssh_keys,
        "Exporter configured"
    );

    let exporter = build_exporter(&config)?;
    let state = Arc::new(AppState::new(exporter, config.web_path.as_str()));

    api::serve(&config.web_address, state).await?;
    info!("Shutting down");

    Ok(())
}

fn print_metrics(config: &ExporterConfig, format: OutputFormat) -> Result<()> {
    let exporter = build_exporter(config)?;
    let docs: Vec<MetricDoc> = exporter.describe().into_iter().map(MetricDoc::from).collect();

    println!("{}", output::render_docs(&docs, format)?);
    Ok(())
}
