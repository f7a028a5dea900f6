//! Exporter configuration

use crate::api::{HEALTH_PATH, READY_PATH};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix, e.g. `HCLOUD_EXPORTER_TOKEN`
const ENV_PREFIX: &str = "HCLOUD_EXPORTER";

/// Exporter configuration
#[derive(Clone, Deserialize)]
pub struct ExporterConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_web_address")]
    pub web_address: String,

    /// Path serving the metrics exposition
    #[serde(default = "default_web_path")]
    pub web_path: String,

    /// API token of the cloud project
    #[serde(default)]
    pub token: String,

    /// Base URL of the cloud API
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Deadline per resource list fetch in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable output
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "enabled")]
    pub collector_servers: bool,

    #[serde(default = "enabled")]
    pub collector_volumes: bool,

    #[serde(default = "enabled")]
    pub collector_floating_ips: bool,

    #[serde(default = "enabled")]
    pub collector_ssh_keys: bool,
}

fn default_web_address() -> String {
    "0.0.0.0:9501".to_string()
}

fn default_web_path() -> String {
    "/metrics".to_string()
}

fn default_api_endpoint() -> String {
    exporter_lib::client::DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn enabled() -> bool {
    true
}

impl std::fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("web_address", &self.web_address)
            .field("web_path", &self.web_path)
            .field("token", &"<redacted>")
            .field("api_endpoint", &self.api_endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .field("collector_servers", &self.collector_servers)
            .field("collector_volumes", &self.collector_volumes)
            .field("collector_floating_ips", &self.collector_floating_ips)
            .field("collector_ssh_keys", &self.collector_ssh_keys)
            .finish()
    }
}

impl ExporterConfig {
    /// Load configuration from an optional file overlaid by environment
    /// variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(
            path,
            config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        )
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Reject settings the exporter cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            bail!("API token is required (set {}_TOKEN)", ENV_PREFIX);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if !self.web_path.starts_with('/') {
            bail!("web_path must start with '/', got {:?}", self.web_path);
        }
        if self.web_path == HEALTH_PATH || self.web_path == READY_PATH {
            bail!("web_path {:?} is reserved for health checks", self.web_path);
        }
        // Captures and wildcards would turn the path into a route pattern
        if self.web_path.contains([':', '*']) {
            bail!("web_path must be a literal path, got {:?}", self.web_path);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
