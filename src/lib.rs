/// Quorum DID resolution
///
/// Resolves DIDs against several independently operated endpoints and only
/// returns a document all of them agree on. Consortium and stakeholder
/// configuration files used for endpoint discovery are kept in an
/// in-memory cache that honours each file's declared lifetime.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod consortium;
pub mod context;
pub mod error;
pub mod federation;
pub mod identity;
pub mod metrics;
pub mod server;

pub use context::AppContext;
pub use error::{ResolverError, ResolverResult};
