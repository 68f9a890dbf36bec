/// Quorum Resolver - resolves a DID against every selected endpoint of its
/// domain and only succeeds when all of them return the same document
use crate::{
    error::{ResolverError, ResolverResult},
    federation::{Discovery, Selection},
    identity::{parse_did, DidDocument, DocumentFetcher, Endpoint},
    metrics,
};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// How the selected endpoints are queried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanOut {
    /// One endpoint after another, stopping at the first failure or mismatch
    #[default]
    Sequential,
    /// All endpoints in flight at once, reconciled in endpoint order
    Concurrent,
}

impl FanOut {
    fn label(self) -> &'static str {
        match self {
            FanOut::Sequential => "sequential",
            FanOut::Concurrent => "concurrent",
        }
    }
}

/// Quorum resolver configuration
#[derive(Debug, Clone)]
pub struct QuorumResolverConfig {
    /// DID method this resolver accepts
    pub did_method: String,
    /// Fixed resolution endpoint; bypasses discovery and selection
    pub resolver_url: Option<String>,
    pub fan_out: FanOut,
}

impl Default for QuorumResolverConfig {
    fn default() -> Self {
        Self {
            did_method: "bloc".to_string(),
            resolver_url: None,
            fan_out: FanOut::Sequential,
        }
    }
}

/// Discover a domain's endpoints and narrow them to the ones to query
pub async fn select_endpoints(
    discovery: &dyn Discovery,
    selection: &dyn Selection,
    domain: &str,
) -> ResolverResult<Vec<Endpoint>> {
    let discovered = discovery
        .get_endpoints(domain)
        .await
        .map_err(|e| ResolverError::DiscoveryFailure {
            domain: domain.to_string(),
            reason: e.to_string(),
            source: Some(Box::new(e)),
        })?;

    if discovered.is_empty() {
        return Err(ResolverError::DiscoveryFailure {
            domain: domain.to_string(),
            reason: "no endpoints discovered".to_string(),
            source: None,
        });
    }

    debug!("Discovered {} endpoints for {}", discovered.len(), domain);

    let selected = selection
        .select_endpoints(discovered)
        .map_err(|e| ResolverError::SelectionFailure {
            domain: domain.to_string(),
            source: Box::new(e),
        })?;

    if selected.is_empty() {
        return Err(ResolverError::NoEndpointsSelected {
            domain: domain.to_string(),
        });
    }

    debug!("Selected {} endpoints for {}", selected.len(), domain);

    Ok(selected)
}

/// DID resolver with cross-endpoint consistency checking
#[derive(Clone)]
pub struct QuorumResolver {
    discovery: Arc<dyn Discovery>,
    selection: Arc<dyn Selection>,
    fetcher: Arc<dyn DocumentFetcher>,
    direct: Option<Endpoint>,
    config: QuorumResolverConfig,
}

impl QuorumResolver {
    pub fn new(
        discovery: Arc<dyn Discovery>,
        selection: Arc<dyn Selection>,
        fetcher: Arc<dyn DocumentFetcher>,
        config: QuorumResolverConfig,
    ) -> Self {
        let direct = config
            .resolver_url
            .as_ref()
            .map(|url| Endpoint::new(url.clone(), String::new()));

        Self {
            discovery,
            selection,
            fetcher,
            direct,
            config,
        }
    }

    pub fn config(&self) -> &QuorumResolverConfig {
        &self.config
    }

    /// Whether this resolver handles the given DID method
    pub fn accepts(&self, method: &str) -> bool {
        method == self.config.did_method
    }

    /// Resolve a DID
    ///
    /// With a fixed resolver URL the DID is fetched from that single
    /// location. Otherwise the domain is taken from the DID itself
    /// (`did:<method>:<domain>:<suffix>`) and resolved by quorum.
    pub async fn resolve(&self, did: &str) -> ResolverResult<DidDocument> {
        let started = Instant::now();
        let mode = if self.direct.is_some() {
            "direct"
        } else {
            self.config.fan_out.label()
        };

        let result = self.resolve_inner(did).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.code(),
        };
        metrics::record_resolution(mode, outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn resolve_inner(&self, did: &str) -> ResolverResult<DidDocument> {
        if let Some(endpoint) = &self.direct {
            return self.fetch_from(endpoint, did).await;
        }

        let parsed = parse_did(did)?;
        if !self.accepts(parsed.method) {
            return Err(ResolverError::UnsupportedMethod(parsed.method.to_string()));
        }

        self.resolve_in_domain(parsed.domain, did).await
    }

    /// Resolve `query` against the endpoints selected for `domain`
    pub async fn resolve_in_domain(&self, domain: &str, query: &str) -> ResolverResult<DidDocument> {
        let endpoints =
            select_endpoints(self.discovery.as_ref(), self.selection.as_ref(), domain).await?;

        match self.config.fan_out {
            FanOut::Sequential => self.reconcile_sequential(&endpoints, query).await,
            FanOut::Concurrent => self.reconcile_concurrent(&endpoints, query).await,
        }
    }

    async fn fetch_from(&self, endpoint: &Endpoint, did: &str) -> ResolverResult<DidDocument> {
        let result = self.fetcher.fetch_document(endpoint, did).await;
        metrics::record_endpoint_fetch(result.is_ok());

        result.map_err(|e| ResolverError::EndpointFetchFailure {
            endpoint: endpoint.url.clone(),
            did: did.to_string(),
            source: Box::new(e),
        })
    }

    async fn reconcile_sequential(
        &self,
        endpoints: &[Endpoint],
        did: &str,
    ) -> ResolverResult<DidDocument> {
        let mut agreed: Option<DidDocument> = None;

        for endpoint in endpoints {
            let doc = self.fetch_from(endpoint, did).await?;
            agreed = Some(match agreed {
                None => doc,
                Some(seen) => agree(seen, doc, &endpoints[0], endpoint, did)?,
            });
        }

        agreed.ok_or_else(|| no_answer(endpoints, did))
    }

    /// Fetches from every endpoint at once and stops at the first failed
    /// fetch or the first pair of differing documents, dropping whatever is
    /// still in flight. Answers that are already complete at that point are
    /// collected before the error is chosen, and the error is the one an
    /// in-order pass over the received answers would report.
    async fn reconcile_concurrent(
        &self,
        endpoints: &[Endpoint],
        did: &str,
    ) -> ResolverResult<DidDocument> {
        let mut in_flight: FuturesUnordered<_> = endpoints
            .iter()
            .enumerate()
            .map(|(i, endpoint)| async move { (i, self.fetch_from(endpoint, did).await) })
            .collect();

        let mut answers: Vec<Option<ResolverResult<DidDocument>>> =
            endpoints.iter().map(|_| None).collect();

        while let Some((i, result)) = in_flight.next().await {
            let decisive = match &result {
                Err(_) => true,
                Ok(doc) => answers.iter().flatten().any(|seen| match seen {
                    Ok(seen) => seen != doc,
                    Err(_) => false,
                }),
            };
            answers[i] = Some(result);

            if decisive {
                while let Some(Some((i, result))) = in_flight.next().now_or_never() {
                    answers[i] = Some(result);
                }
                break;
            }
        }

        reconcile_received(endpoints, answers, did)
    }
}

/// Walk the received answers in endpoint order, skipping endpoints that
/// never answered
fn reconcile_received(
    endpoints: &[Endpoint],
    answers: Vec<Option<ResolverResult<DidDocument>>>,
    did: &str,
) -> ResolverResult<DidDocument> {
    let mut agreed: Option<(DidDocument, &Endpoint)> = None;

    for (endpoint, answer) in endpoints.iter().zip(answers) {
        let Some(answer) = answer else {
            continue;
        };
        let doc = answer?;
        agreed = Some(match agreed {
            None => (doc, endpoint),
            Some((seen, first)) => (agree(seen, doc, first, endpoint, did)?, first),
        });
    }

    agreed
        .map(|(doc, _)| doc)
        .ok_or_else(|| no_answer(endpoints, did))
}

/// Check one more answer against the agreed document
fn agree(
    agreed: DidDocument,
    doc: DidDocument,
    first: &Endpoint,
    endpoint: &Endpoint,
    did: &str,
) -> ResolverResult<DidDocument> {
    if agreed == doc {
        return Ok(agreed);
    }

    warn!(
        "Endpoints {} and {} returned different documents for {}",
        first, endpoint, did
    );
    Err(ResolverError::InconsistentEndpoints {
        did: did.to_string(),
        first: first.url.clone(),
        conflicting: endpoint.url.clone(),
    })
}

fn no_answer(endpoints: &[Endpoint], did: &str) -> ResolverError {
    ResolverError::Internal(format!(
        "no document reconciled for {} from {} endpoints",
        did,
        endpoints.len()
    ))
}
