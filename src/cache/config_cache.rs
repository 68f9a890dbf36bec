/// Caching wrapper around a consortium configuration source
use crate::{
    cache::ExpiringCache,
    consortium::{ConfigSource, Consortium, Stakeholder},
    error::{ResolverError, ResolverResult},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Cache category constants
pub mod categories {
    pub const CONSORTIUM: &str = "consortium";
    pub const STAKEHOLDER: &str = "stakeholder";
}

/// Encode an (origin, domain) pair as a single cache key
pub fn cache_key(origin: &str, domain: &str) -> String {
    serde_json::json!([origin, domain]).to_string()
}

fn decode_key(key: &str) -> ResolverResult<(String, String)> {
    serde_json::from_str(key)
        .map_err(|e| ResolverError::Internal(format!("Malformed cache key {}: {}", key, e)))
}

/// Serves consortium and stakeholder files from two independent caches,
/// falling back to the wrapped source on a miss or expiry
pub struct CachedConfigSource {
    consortiums: ExpiringCache<Consortium>,
    stakeholders: ExpiringCache<Stakeholder>,
}

impl CachedConfigSource {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        let consortium_source = source.clone();
        let consortiums = ExpiringCache::new(categories::CONSORTIUM, move |key: String| {
            let source = consortium_source.clone();
            async move {
                let (origin, domain) = decode_key(&key)?;
                source.get_consortium(&origin, &domain).await
            }
        });

        let stakeholders = ExpiringCache::new(categories::STAKEHOLDER, move |key: String| {
            let source = source.clone();
            async move {
                let (origin, domain) = decode_key(&key)?;
                source.get_stakeholder(&origin, &domain).await
            }
        });

        Self {
            consortiums,
            stakeholders,
        }
    }
}

#[async_trait]
impl ConfigSource for CachedConfigSource {
    async fn get_consortium(&self, origin: &str, domain: &str) -> ResolverResult<Consortium> {
        self.consortiums.get(&cache_key(origin, domain)).await
    }

    async fn get_stakeholder(&self, origin: &str, domain: &str) -> ResolverResult<Stakeholder> {
        self.stakeholders.get(&cache_key(origin, domain)).await
    }
}
