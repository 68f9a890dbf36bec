/// Health and metrics endpoints
use crate::{context::AppContext, metrics};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/metrics", get(metrics_handler))
}

/// Basic health check
///
/// Returns status, version and the resolution mode in use
pub async fn health_basic(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let resolver = ctx.resolver.config();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "didMethod": resolver.did_method,
        "direct": resolver.resolver_url.is_some(),
        "fanOut": resolver.fan_out,
    }))
}

/// Prometheus text exposition
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}
