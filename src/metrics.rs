/// Metrics and telemetry for the quorum resolver
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - DID resolutions by outcome
/// - Per-endpoint fetch outcomes
/// - Configuration cache hit/miss rates

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // ========== Resolution Metrics ==========

    /// DID resolutions by mode and outcome
    pub static ref RESOLUTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "did_resolutions_total",
        "Total number of DID resolutions",
        &["mode", "outcome"]
    )
    .unwrap();

    /// DID resolution duration in seconds
    pub static ref RESOLUTION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "did_resolution_duration_seconds",
        "DID resolution latencies in seconds",
        &["mode"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    /// Single-endpoint fetches by outcome
    pub static ref ENDPOINT_FETCHES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "endpoint_fetches_total",
        "Total number of single-endpoint document fetches",
        &["outcome"]
    )
    .unwrap();

    // ========== Cache Metrics ==========

    /// Cache hits by cache type
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cache_hits_total",
        "Total number of cache hits",
        &["cache_type"]
    )
    .unwrap();

    /// Cache misses by cache type
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cache_misses_total",
        "Total number of cache misses",
        &["cache_type"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Record a finished resolution
pub fn record_resolution(mode: &str, outcome: &str, duration: f64) {
    RESOLUTIONS_TOTAL.with_label_values(&[mode, outcome]).inc();
    RESOLUTION_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration);
}

/// Record one endpoint fetch
pub fn record_endpoint_fetch(success: bool) {
    ENDPOINT_FETCHES_TOTAL
        .with_label_values(&[if success { "success" } else { "failure" }])
        .inc();
}

/// Record a cache access
pub fn record_cache_access(cache_type: &str, hit: bool) {
    if hit {
        CACHE_HITS_TOTAL.with_label_values(&[cache_type]).inc();
    } else {
        CACHE_MISSES_TOTAL.with_label_values(&[cache_type]).inc();
    }
}
