/// Unified error types for the quorum resolver
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Main error type for resolution and configuration caching
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Discovery failed or produced no endpoints for the domain
    #[error("Failed to discover endpoints for {domain}: {reason}")]
    DiscoveryFailure {
        domain: String,
        reason: String,
        #[source]
        source: Option<Box<ResolverError>>,
    },

    /// Selection failed outright
    #[error("Failed to select endpoints for {domain}: {source}")]
    SelectionFailure {
        domain: String,
        #[source]
        source: Box<ResolverError>,
    },

    /// Selection reduced the candidate set to nothing
    #[error("No endpoints selected for {domain}")]
    NoEndpointsSelected { domain: String },

    /// One queried endpoint failed to answer
    #[error("Endpoint {endpoint} failed to resolve {did}: {source}")]
    EndpointFetchFailure {
        endpoint: String,
        did: String,
        #[source]
        source: Box<ResolverError>,
    },

    /// Two endpoints returned different documents for the same DID
    #[error("Endpoints {first} and {conflicting} returned different documents for {did}")]
    InconsistentEndpoints {
        did: String,
        first: String,
        conflicting: String,
    },

    /// Cache loader failed on a miss or expiry
    ///
    /// The cause is shared with every caller that waited on the same refresh.
    #[error("Failed to fetch {category} {key}: {source}")]
    CacheFetchFailure {
        category: &'static str,
        key: String,
        #[source]
        source: Arc<ResolverError>,
    },

    /// Fetched object did not report a usable lifetime
    #[error("Invalid cache lifetime for {category} {key}: {reason}")]
    InvalidLifetime {
        category: &'static str,
        key: String,
        reason: String,
    },

    /// A refresh completed but the entry is missing on the second lookup
    #[error("Refreshing expired {category} {key} left no entry")]
    CacheRefreshInconsistency { category: &'static str, key: String },

    /// Malformed DID
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// DID method not handled by this resolver
    #[error("Unsupported DID method: {0}")]
    UnsupportedMethod(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResolverError {
    /// Stable error code used in HTTP responses and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            ResolverError::DiscoveryFailure { .. } => "DiscoveryFailure",
            ResolverError::SelectionFailure { .. } => "SelectionFailure",
            ResolverError::NoEndpointsSelected { .. } => "NoEndpointsSelected",
            ResolverError::EndpointFetchFailure { .. } => "EndpointFetchFailure",
            ResolverError::InconsistentEndpoints { .. } => "InconsistentEndpoints",
            ResolverError::CacheFetchFailure { .. } => "CacheFetchFailure",
            ResolverError::InvalidLifetime { .. } => "InvalidLifetime",
            ResolverError::CacheRefreshInconsistency { .. } => "CacheRefreshInconsistency",
            ResolverError::InvalidDid(_) => "InvalidDid",
            ResolverError::UnsupportedMethod(_) => "UnsupportedMethod",
            ResolverError::Validation(_) => "InvalidRequest",
            ResolverError::NotFound(_) => "NotFound",
            ResolverError::Http(_) => "HttpError",
            ResolverError::Internal(_) => "InternalServerError",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ResolverError to HTTP response
impl IntoResponse for ResolverError {
    fn into_response(self) -> Response {
        let status = match &self {
            ResolverError::InvalidDid(_)
            | ResolverError::UnsupportedMethod(_)
            | ResolverError::Validation(_) => StatusCode::BAD_REQUEST,
            ResolverError::NotFound(_) => StatusCode::NOT_FOUND,
            ResolverError::DiscoveryFailure { .. }
            | ResolverError::SelectionFailure { .. }
            | ResolverError::NoEndpointsSelected { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ResolverError::EndpointFetchFailure { .. }
            | ResolverError::InconsistentEndpoints { .. }
            | ResolverError::CacheFetchFailure { .. }
            | ResolverError::InvalidLifetime { .. }
            | ResolverError::Http(_) => StatusCode::BAD_GATEWAY,
            ResolverError::CacheRefreshInconsistency { .. } | ResolverError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            ResolverError::Internal(_) => "Internal server error".to_string(), // Don't leak details
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for resolver operations
pub type ResolverResult<T> = Result<T, ResolverError>;
