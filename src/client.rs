/// DID client - submits create requests to a domain's endpoints
use crate::{
    error::{ResolverError, ResolverResult},
    federation::{Discovery, Selection},
    identity::{resolver::select_endpoints, DidDocument, DocumentFetcher},
};
use std::sync::Arc;
use tracing::info;

/// Client for creating DIDs in a domain
///
/// The create request is built by the caller and forwarded untouched; the
/// client only decides where it goes.
#[derive(Clone)]
pub struct DidClient {
    discovery: Arc<dyn Discovery>,
    selection: Arc<dyn Selection>,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl DidClient {
    pub fn new(
        discovery: Arc<dyn Discovery>,
        selection: Arc<dyn Selection>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Self {
        Self {
            discovery,
            selection,
            fetcher,
        }
    }

    /// Send a create request to the first selected endpoint of `domain`
    pub async fn create_did(
        &self,
        domain: &str,
        request: &serde_json::Value,
    ) -> ResolverResult<DidDocument> {
        if domain.is_empty() {
            return Err(ResolverError::Validation("domain is empty".to_string()));
        }

        let endpoints =
            select_endpoints(self.discovery.as_ref(), self.selection.as_ref(), domain).await?;
        let endpoint = &endpoints[0];

        let doc = self
            .fetcher
            .create_document(endpoint, request)
            .await
            .map_err(|e| ResolverError::EndpointFetchFailure {
                endpoint: endpoint.url.clone(),
                did: domain.to_string(),
                source: Box::new(e),
            })?;

        info!("Created DID {:?} via {}", doc.id(), endpoint);

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::federation::{StaticDiscovery, StaticSelection};
    use crate::identity::Endpoint;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingFetcher {
        created: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl DocumentFetcher for RecordingFetcher {
        async fn fetch_document(&self, endpoint: &Endpoint, _did: &str) -> ResolverResult<DidDocument> {
            Err(ResolverError::NotFound(endpoint.url.clone()))
        }

        async fn create_document(
            &self,
            endpoint: &Endpoint,
            request: &serde_json::Value,
        ) -> ResolverResult<DidDocument> {
            self.created
                .lock()
                .await
                .push((endpoint.url.clone(), request.clone()));
            Ok(DidDocument::new(json!({"id": "did:bloc:example.com:new"})))
        }
    }

    fn client(fetcher: Arc<RecordingFetcher>) -> DidClient {
        let discovery = StaticDiscovery::default()
            .with_domain(
                "example.com",
                vec!["https://a.example.com".to_string(), "https://b.example.com".to_string()],
            )
            .with_domain("empty.com", vec![]);
        DidClient::new(Arc::new(discovery), Arc::new(StaticSelection), fetcher)
    }

    #[tokio::test]
    async fn test_create_goes_to_first_endpoint() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let client = client(fetcher.clone());

        let request = json!({"type": "create", "suffixData": "abc"});
        let doc = client.create_did("example.com", &request).await.unwrap();
        assert_eq!(doc.id(), Some("did:bloc:example.com:new"));

        let created = fetcher.created.lock().await.clone();
        assert_eq!(created, vec![("https://a.example.com".to_string(), request)]);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_domain() {
        let client = client(Arc::new(RecordingFetcher::default()));
        let err = client.create_did("", &json!({})).await.unwrap_err();
        assert!(matches!(err, ResolverError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_without_endpoints() {
        let client = client(Arc::new(RecordingFetcher::default()));
        let err = client.create_did("empty.com", &json!({})).await.unwrap_err();
        assert!(matches!(err, ResolverError::DiscoveryFailure { .. }));
    }
}
