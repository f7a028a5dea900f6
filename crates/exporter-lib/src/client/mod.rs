//! Cloud API access
//!
//! Collectors only see the [`CloudApi`] trait: one call per resource type
//! that returns the complete list or fails. Pagination and transport live
//! behind it in [`HttpClient`].

mod http;

pub use http::{HttpClient, DEFAULT_ENDPOINT};

use crate::models::{FloatingIp, Server, SshKey, Volume};
use async_trait::async_trait;

/// Errors returned by the cloud API facade
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx status code from the API.
    #[error("API HTTP error: status={status}, body={body}")]
    Http { status: u16, body: String },

    /// Transport level failure from `reqwest`.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response payload did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configured endpoint is not a valid base URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Fetch-all operations of the cloud API, one per resource type
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn servers(&self) -> Result<Vec<Server>, ApiError>;

    async fn volumes(&self) -> Result<Vec<Volume>, ApiError>;

    async fn floating_ips(&self) -> Result<Vec<FloatingIp>, ApiError>;

    async fn ssh_keys(&self) -> Result<Vec<SshKey>, ApiError>;
}
