/// Endpoint discovery and selection
///
/// The resolver only talks to these two capabilities:
/// - `Discovery` turns a domain into the endpoints serving it
/// - `Selection` narrows that set down to the endpoints actually queried

pub mod discovery;
pub mod selection;

pub use discovery::{ConsortiumDiscovery, StaticDiscovery};
pub use selection::{RandomSelection, StaticSelection};

use crate::{error::ResolverResult, identity::Endpoint};
use async_trait::async_trait;

/// Finds the endpoints serving a domain
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn get_endpoints(&self, domain: &str) -> ResolverResult<Vec<Endpoint>>;
}

/// Picks which discovered endpoints to query
pub trait Selection: Send + Sync {
    fn select_endpoints(&self, endpoints: Vec<Endpoint>) -> ResolverResult<Vec<Endpoint>>;
}
