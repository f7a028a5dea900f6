//! HTTP implementation of the cloud API facade

use super::{ApiError, CloudApi};
use crate::models::{FloatingIp, Server, SshKey, Volume};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Public API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.hetzner.cloud/v1/";

const PER_PAGE: u32 = 50;

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next_page: Option<u32>,
}

/// API client backed by `reqwest`
///
/// Follows `meta.pagination.next_page` until the last page and returns the
/// concatenated list. Requests are not retried.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpClient {
    /// Create a new client for the given endpoint and API token
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("hcloud-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = if endpoint.ends_with('/') {
            Url::parse(endpoint)?
        } else {
            Url::parse(&format!("{}/", endpoint))?
        };

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Get the base URL
    pub fn endpoint(&self) -> &Url {
        &self.base_url
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>, ApiError> {
        let url = self.base_url.join(path)?;
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .client
                .get(url.clone())
                .bearer_auth(&self.token)
                .query(&[("page", page), ("per_page", PER_PAGE)])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Http { status, body });
            }

            let mut body: serde_json::Value = response.json().await?;
            let raw = body
                .get_mut(key)
                .map(serde_json::Value::take)
                .unwrap_or_default();
            let batch: Vec<T> = serde_json::from_value(raw)?;
            let meta: Meta = match body.get_mut("meta") {
                Some(meta) => serde_json::from_value(meta.take())?,
                None => Meta::default(),
            };

            debug!(path = %path, page = page, count = batch.len(), "Fetched page");
            items.extend(batch);

            match meta.pagination.and_then(|p| p.next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl CloudApi for HttpClient {
    async fn servers(&self) -> Result<Vec<Server>, ApiError> {
        self.list("servers", "servers").await
    }

    async fn volumes(&self) -> Result<Vec<Volume>, ApiError> {
        self.list("volumes", "volumes").await
    }

    async fn floating_ips(&self) -> Result<Vec<FloatingIp>, ApiError> {
        self.list("floating_ips", "floating_ips").await
    }

    async fn ssh_keys(&self) -> Result<Vec<SshKey>, ApiError> {
        self.list("ssh_keys", "ssh_keys").await
    }
}
