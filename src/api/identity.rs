/// Identity API endpoints
/// Resolution and creation of DIDs over HTTP
use crate::{
    context::AppContext,
    error::{ResolverError, ResolverResult},
    identity::DidDocument,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// GET /1.0/identifiers/:did
///
/// Resolve a DID by quorum
pub async fn resolve_did(
    State(ctx): State<AppContext>,
    Path(did): Path<String>,
) -> ResolverResult<Json<DidDocument>> {
    if did.is_empty() {
        return Err(ResolverError::Validation("DID cannot be empty".to_string()));
    }

    let doc = ctx.resolver.resolve(&did).await?;

    Ok(Json(doc))
}

/// POST /1.0/domains/:domain/identifiers
///
/// Forward an opaque create request to the domain
pub async fn create_did(
    State(ctx): State<AppContext>,
    Path(domain): Path<String>,
    Json(request): Json<serde_json::Value>,
) -> ResolverResult<(StatusCode, Json<DidDocument>)> {
    let doc = ctx.client.create_did(&domain, &request).await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

/// Build identity routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/1.0/identifiers/:did", get(resolve_did))
        .route("/1.0/domains/:domain/identifiers", post(create_did))
}
