/// Consortium and stakeholder configuration files
///
/// A consortium file, hosted by the consortium domain, lists its member
/// stakeholders. Each stakeholder hosts a file for that consortium naming
/// the endpoints it operates. Both declare how long they may be cached.

pub mod http;

pub use http::HttpConfigSource;

use crate::{cache::Cacheable, error::ResolverResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fetches consortium and stakeholder files
///
/// `origin` is the host serving the file, `domain` the consortium it
/// describes.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn get_consortium(&self, origin: &str, domain: &str) -> ResolverResult<Consortium>;
    async fn get_stakeholder(&self, origin: &str, domain: &str) -> ResolverResult<Stakeholder>;
}

/// Declared cache lifetime of a configuration file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheControl {
    /// Seconds the file stays valid after it was fetched
    pub max_age: u64,
}

impl CacheControl {
    fn lifetime(&self) -> Result<Duration, String> {
        if self.max_age == 0 {
            return Err("max_age is zero".to_string());
        }
        Ok(Duration::from_secs(self.max_age))
    }
}

/// Member entry in a consortium file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderListElement {
    pub domain: String,
    #[serde(default)]
    pub did: String,
}

/// Consortium file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consortium {
    pub domain: String,
    #[serde(default)]
    pub members: Vec<StakeholderListElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub cache: CacheControl,
}

/// Stakeholder file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub domain: String,
    #[serde(default)]
    pub did: String,
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    pub cache: CacheControl,
}

impl Cacheable for Consortium {
    fn cache_lifetime(&self) -> Result<Duration, String> {
        self.cache.lifetime()
    }
}

impl Cacheable for Stakeholder {
    fn cache_lifetime(&self) -> Result<Duration, String> {
        self.cache.lifetime()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_consortium_file() {
        let consortium: Consortium = serde_json::from_value(json!({
            "domain": "consortium.net",
            "policy": {"num_queries": 2},
            "members": [
                {"domain": "one.net", "did": "did:bloc:consortium.net:one"},
                {"domain": "two.net"}
            ],
            "cache": {"max_age": 600}
        }))
        .unwrap();

        assert_eq!(consortium.members.len(), 2);
        assert_eq!(consortium.members[1].did, "");
        assert_eq!(consortium.cache_lifetime(), Ok(Duration::from_secs(600)));
    }

    #[test]
    fn test_zero_max_age_is_not_cacheable() {
        let stakeholder: Stakeholder = serde_json::from_value(json!({
            "domain": "one.net",
            "endpoints": ["https://one.net/sidetree"],
            "cache": {"max_age": 0}
        }))
        .unwrap();

        assert!(stakeholder.cache_lifetime().is_err());
    }
}
