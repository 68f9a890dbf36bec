/// HTTP source for consortium and stakeholder files
use crate::{
    consortium::{ConfigSource, Consortium, Stakeholder},
    error::{ResolverError, ResolverResult},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Well-known directory holding configuration files on each origin
pub const WELL_KNOWN_PATH: &str = ".well-known/did-bloc";

/// Fetches `<origin>/.well-known/did-bloc/<domain>.json`
#[derive(Clone)]
pub struct HttpConfigSource {
    http_client: Client,
}

impl HttpConfigSource {
    pub fn new(user_agent: &str, timeout: Duration) -> ResolverResult<Self> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Build the file URL; bare hosts default to https
    pub fn config_url(origin: &str, domain: &str) -> String {
        let base = if origin.starts_with("http://") || origin.starts_with("https://") {
            origin.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", origin.trim_end_matches('/'))
        };

        format!("{}/{}/{}.json", base, WELL_KNOWN_PATH, domain)
    }

    async fn fetch_file<T: DeserializeOwned>(&self, origin: &str, domain: &str) -> ResolverResult<T> {
        let url = Self::config_url(origin, domain);

        debug!("Fetching configuration file {}", url);

        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolverError::NotFound(format!("configuration file {}", url)));
        }

        if !status.is_success() {
            return Err(ResolverError::Internal(format!(
                "{} returned status {}",
                url, status
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ConfigSource for HttpConfigSource {
    async fn get_consortium(&self, origin: &str, domain: &str) -> ResolverResult<Consortium> {
        self.fetch_file(origin, domain).await
    }

    async fn get_stakeholder(&self, origin: &str, domain: &str) -> ResolverResult<Stakeholder> {
        self.fetch_file(origin, domain).await
    }
}
