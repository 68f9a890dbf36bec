/// Single-endpoint DID document fetcher
use crate::{
    error::{ResolverError, ResolverResult},
    identity::{DidDocument, Endpoint},
};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const DID_LD_JSON: &str = "application/did+ld+json";

/// Fetches documents from one endpoint
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Resolve `did` against a single endpoint
    async fn fetch_document(&self, endpoint: &Endpoint, did: &str) -> ResolverResult<DidDocument>;

    /// Submit an opaque create request to a single endpoint
    async fn create_document(
        &self,
        endpoint: &Endpoint,
        _request: &serde_json::Value,
    ) -> ResolverResult<DidDocument> {
        Err(ResolverError::Validation(format!(
            "create is not supported by the fetcher for {}",
            endpoint
        )))
    }
}

/// HTTP binding: `GET <endpoint>/<did>`
#[derive(Clone)]
pub struct HttpDocumentFetcher {
    http_client: Client,
}

impl HttpDocumentFetcher {
    /// Create a new fetcher with its own HTTP client
    pub fn new(user_agent: &str, timeout: Duration) -> ResolverResult<Self> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ResolverError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Create a fetcher sharing an existing client
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }

    fn document_url(endpoint: &Endpoint, did: &str) -> String {
        format!("{}/{}", endpoint.url.trim_end_matches('/'), did)
    }

    async fn read_document(
        response: reqwest::Response,
        endpoint: &Endpoint,
    ) -> ResolverResult<DidDocument> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolverError::NotFound(format!(
                "{} has no document",
                endpoint
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::Internal(format!(
                "got unexpected response from {} status '{}' body {}",
                endpoint, status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(unwrap_resolution_result(body))
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_document(&self, endpoint: &Endpoint, did: &str) -> ResolverResult<DidDocument> {
        let url = Self::document_url(endpoint, did);

        debug!("Fetching DID document from {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, DID_LD_JSON)
            .send()
            .await?;

        Self::read_document(response, endpoint).await
    }

    async fn create_document(
        &self,
        endpoint: &Endpoint,
        request: &serde_json::Value,
    ) -> ResolverResult<DidDocument> {
        debug!("Submitting create request to {}", endpoint);

        let response = self
            .http_client
            .post(&endpoint.url)
            .json(request)
            .send()
            .await?;

        Self::read_document(response, endpoint).await
    }
}

/// Endpoints may answer with the bare document or a resolution result
/// carrying it under `didDocument`.
fn unwrap_resolution_result(body: serde_json::Value) -> DidDocument {
    match body {
        serde_json::Value::Object(mut map) if map.contains_key("didDocument") => map
            .remove("didDocument")
            .map(DidDocument::new)
            .unwrap_or_default(),
        other => DidDocument::new(other),
    }
}
