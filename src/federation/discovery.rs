/// Endpoint discovery for DID domains
///
/// Two sources of endpoints:
/// - A static, configured list per domain
/// - The consortium file of the domain and its members' stakeholder files
use crate::{
    consortium::ConfigSource,
    error::{ResolverError, ResolverResult},
    federation::Discovery,
    identity::Endpoint,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Discovery backed by a fixed domain -> URLs map
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    endpoints: HashMap<String, Vec<String>>,
}

impl StaticDiscovery {
    pub fn new(endpoints: HashMap<String, Vec<String>>) -> Self {
        Self { endpoints }
    }

    /// Add endpoint URLs for a domain
    pub fn with_domain(mut self, domain: impl Into<String>, urls: Vec<String>) -> Self {
        self.endpoints.entry(domain.into()).or_default().extend(urls);
        self
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn get_endpoints(&self, domain: &str) -> ResolverResult<Vec<Endpoint>> {
        let urls = self
            .endpoints
            .get(domain)
            .ok_or_else(|| ResolverError::NotFound(format!("no endpoints configured for {}", domain)))?;

        Ok(urls
            .iter()
            .map(|url| Endpoint::new(url.clone(), domain))
            .collect())
    }
}

/// Discovery through the consortium configuration of a domain
///
/// Reads the consortium file hosted by the domain, then the stakeholder
/// file each member hosts for that consortium, and collects their
/// endpoints in member order.
#[derive(Clone)]
pub struct ConsortiumDiscovery {
    config: Arc<dyn ConfigSource>,
}

impl ConsortiumDiscovery {
    pub fn new(config: Arc<dyn ConfigSource>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Discovery for ConsortiumDiscovery {
    async fn get_endpoints(&self, domain: &str) -> ResolverResult<Vec<Endpoint>> {
        let consortium = self.config.get_consortium(domain, domain).await?;

        let mut endpoints = Vec::new();
        for member in &consortium.members {
            let stakeholder = self.config.get_stakeholder(&member.domain, domain).await?;

            debug!(
                "Stakeholder {} lists {} endpoints",
                member.domain,
                stakeholder.endpoints.len()
            );

            endpoints.extend(
                stakeholder
                    .endpoints
                    .iter()
                    .map(|url| Endpoint::new(url.clone(), member.domain.clone())),
            );
        }

        info!(
            "Discovered {} endpoints from {} consortium members of {}",
            endpoints.len(),
            consortium.members.len(),
            domain
        );

        Ok(endpoints)
    }
}
