/// Identity Resolution System
///
/// Resolves DIDs against the endpoints of a domain and checks that every
/// queried endpoint returns the same document.

pub mod fetcher;
pub mod resolver;

pub use fetcher::{DocumentFetcher, HttpDocumentFetcher};
pub use resolver::{FanOut, QuorumResolver, QuorumResolverConfig};

use crate::error::{ResolverError, ResolverResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One network location serving a domain's DIDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Base URL of the endpoint
    pub url: String,
    /// Domain of the stakeholder operating the endpoint
    pub domain: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Resolved DID document
///
/// The resolver never looks inside the document; reconciliation only
/// relies on structural equality of the underlying JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DidDocument(serde_json::Value);

impl DidDocument {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// `id` field of the document, if present
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(|v| v.as_str())
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for DidDocument {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Parsed `did:<method>:<domain>:<suffix>` identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDid<'a> {
    pub method: &'a str,
    pub domain: &'a str,
    pub suffix: &'a str,
}

/// Split a DID into its method, domain and suffix
pub fn parse_did(did: &str) -> ResolverResult<ParsedDid<'_>> {
    let parts: Vec<&str> = did.split(':').collect();
    if parts.len() != 4 || parts[0] != "did" {
        return Err(ResolverError::InvalidDid(format!("wrong did {}", did)));
    }

    if parts[1..].iter().any(|p| p.is_empty()) {
        return Err(ResolverError::InvalidDid(format!("empty segment in {}", did)));
    }

    Ok(ParsedDid {
        method: parts[1],
        domain: parts[2],
        suffix: parts[3],
    })
}
