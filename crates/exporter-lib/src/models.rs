//! Resource records returned by the cloud API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a server
///
/// Deserialized from the raw API string. Values this crate does not know
/// are kept verbatim in `Other`, so comparisons stay exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerStatus {
    Running,
    Initializing,
    Starting,
    Stopping,
    Off,
    Deleting,
    Migrating,
    Rebuilding,
    Unknown,
    Other(String),
}

impl From<String> for ServerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => ServerStatus::Running,
            "initializing" => ServerStatus::Initializing,
            "starting" => ServerStatus::Starting,
            "stopping" => ServerStatus::Stopping,
            "off" => ServerStatus::Off,
            "deleting" => ServerStatus::Deleting,
            "migrating" => ServerStatus::Migrating,
            "rebuilding" => ServerStatus::Rebuilding,
            "unknown" => ServerStatus::Unknown,
            _ => ServerStatus::Other(value),
        }
    }
}

impl From<ServerStatus> for String {
    fn from(status: ServerStatus) -> Self {
        status.as_str().to_string()
    }
}

impl ServerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ServerStatus::Running => "running",
            ServerStatus::Initializing => "initializing",
            ServerStatus::Starting => "starting",
            ServerStatus::Stopping => "stopping",
            ServerStatus::Off => "off",
            ServerStatus::Deleting => "deleting",
            ServerStatus::Migrating => "migrating",
            ServerStatus::Rebuilding => "rebuilding",
            ServerStatus::Unknown => "unknown",
            ServerStatus::Other(raw) => raw,
        }
    }
}

/// Net and gross amounts as decimal strings, exactly as the API sends them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub net: String,
    pub gross: String,
}

/// Price quote of a server type for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    /// Location name, e.g. `fsn1`
    pub location: String,
    pub price_hourly: Price,
    pub price_monthly: Price,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerType {
    pub name: String,
    pub cores: u32,
    /// Memory size as reported by the API
    pub memory: f64,
    /// Disk size as reported by the API
    pub disk: u64,
    /// `None` when the payload carries no price list at all
    #[serde(default)]
    pub prices: Option<Vec<PricingTier>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datacenter {
    pub name: String,
    pub location: Location,
}

/// Attachment of a server to a private network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateNet {
    /// Network ID
    pub network: i64,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Value of the `network` label of a server
///
/// Only the first private network attachment is reflected. Servers attached
/// to several networks still produce one series per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkLabel {
    Public,
    Private(i64),
}

impl fmt::Display for NetworkLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkLabel::Public => f.write_str("public"),
            NetworkLabel::Private(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: i64,
    pub name: String,
    pub status: ServerStatus,
    pub created: DateTime<Utc>,
    /// `None` when the payload omits the attachment list
    #[serde(default)]
    pub private_net: Option<Vec<PrivateNet>>,
    pub server_type: ServerType,
    pub datacenter: Datacenter,
    #[serde(default)]
    pub backup_window: Option<String>,
    #[serde(default)]
    pub included_traffic: Option<u64>,
    #[serde(default)]
    pub outgoing_traffic: Option<u64>,
    #[serde(default)]
    pub ingoing_traffic: Option<u64>,
}

impl Server {
    /// Network label derived from the first private network attachment
    pub fn network(&self) -> NetworkLabel {
        match self.attachments().first() {
            Some(attachment) => NetworkLabel::Private(attachment.network),
            None => NetworkLabel::Public,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ServerStatus::Running
    }

    pub fn backup_enabled(&self) -> bool {
        self.backup_window
            .as_deref()
            .map(|window| !window.is_empty())
            .unwrap_or(false)
    }

    /// Private network attachments, empty when none are reported
    pub fn attachments(&self) -> &[PrivateNet] {
        self.private_net.as_deref().unwrap_or_default()
    }

    /// Pricing tiers quoted for the server's own location
    ///
    /// Every matching tier is kept, duplicates included.
    pub fn price_lookup(&self) -> PriceLookup<'_> {
        let Some(prices) = self.server_type.prices.as_deref() else {
            return PriceLookup::Missing;
        };
        if prices.is_empty() {
            return PriceLookup::Empty;
        }

        let location = self.datacenter.location.name.as_str();
        let matched: Vec<&PricingTier> = prices
            .iter()
            .filter(|tier| tier.location == location)
            .collect();

        if matched.is_empty() {
            PriceLookup::NoMatch
        } else {
            PriceLookup::Matched(matched)
        }
    }
}

/// Outcome of looking up the price tiers of a server's location
#[derive(Debug, Clone, PartialEq)]
pub enum PriceLookup<'a> {
    /// The server type carries no price list
    Missing,
    /// The price list is present but empty
    Empty,
    /// No tier is quoted for the server's location
    NoMatch,
    Matched(Vec<&'a PricingTier>),
}

impl PriceLookup<'_> {
    /// Matching tiers, empty for every other outcome
    pub fn tiers(&self) -> &[&PricingTier] {
        match self {
            PriceLookup::Matched(tiers) => tiers,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Protection {
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub server: Option<i64>,
    pub location: Location,
    /// Size in GB
    pub size: u64,
    pub status: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub protection: Protection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ip: String,
    #[serde(rename = "type")]
    pub ip_type: String,
    #[serde(default)]
    pub server: Option<i64>,
    pub home_location: Location,
    #[serde(default)]
    pub blocked: bool,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub protection: Protection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SshKey {
    pub id: i64,
    pub name: String,
    pub fingerprint: String,
    pub created: DateTime<Utc>,
}
