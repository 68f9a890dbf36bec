/// Application context and dependency injection
use crate::{
    cache::CachedConfigSource,
    client::DidClient,
    config::{AppConfig, DiscoveryConfig},
    consortium::HttpConfigSource,
    error::ResolverResult,
    federation::{ConsortiumDiscovery, Discovery, RandomSelection, Selection, StaticDiscovery, StaticSelection},
    identity::{DocumentFetcher, HttpDocumentFetcher, QuorumResolver, QuorumResolverConfig},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<QuorumResolver>,
    pub client: Arc<DidClient>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub fn new(config: AppConfig) -> ResolverResult<Self> {
        config.validate()?;

        let timeout = Duration::from_secs(config.http.timeout_secs);

        let fetcher: Arc<dyn DocumentFetcher> =
            Arc::new(HttpDocumentFetcher::new(&config.http.user_agent, timeout)?);

        let discovery: Arc<dyn Discovery> = match &config.discovery {
            DiscoveryConfig::Static { endpoints } => {
                info!("Using static discovery for {} domains", endpoints.len());
                Arc::new(StaticDiscovery::new(endpoints.clone()))
            }
            DiscoveryConfig::Consortium => {
                info!("Using consortium discovery with cached configuration files");
                let source = HttpConfigSource::new(&config.http.user_agent, timeout)?;
                let cached = CachedConfigSource::new(Arc::new(source));
                Arc::new(ConsortiumDiscovery::new(Arc::new(cached)))
            }
        };

        let selection: Arc<dyn Selection> = match config.resolver.selection_count {
            Some(count) => Arc::new(RandomSelection::new(count)?),
            None => Arc::new(StaticSelection),
        };

        Ok(Self::from_parts(config, discovery, selection, fetcher))
    }

    /// Assemble a context from already-built collaborators
    pub fn from_parts(
        config: AppConfig,
        discovery: Arc<dyn Discovery>,
        selection: Arc<dyn Selection>,
        fetcher: Arc<dyn DocumentFetcher>,
    ) -> Self {
        let resolver = QuorumResolver::new(
            discovery.clone(),
            selection.clone(),
            fetcher.clone(),
            QuorumResolverConfig {
                did_method: config.resolver.did_method.clone(),
                resolver_url: config.resolver.resolver_url.clone(),
                fan_out: config.resolver.fan_out,
            },
        );
        let client = DidClient::new(discovery, selection, fetcher);

        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
            client: Arc::new(client),
        }
    }

    /// Public address this service binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.config.service.hostname, self.config.service.port)
    }
}
