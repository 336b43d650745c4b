// Prometheus metrics for feed access, lookups and the avatar cache.

use lazy_static::lazy_static;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Feed requests by endpoint (index, detail) and outcome (ok, malformed, status, network).
    pub static ref FEED_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ninja_feed_requests_total", "Total ninja feed requests"),
        &["endpoint", "outcome"],
    )
    .unwrap();

    /// Lookups by outcome (found, not_found, empty_query, detail_failed).
    pub static ref LOOKUPS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ninja_lookups_total", "Total ninja lookups"),
        &["outcome"],
    )
    .unwrap();

    /// Avatar cache lookups by result (hit, miss, failed).
    pub static ref AVATAR_CACHE_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("ninja_avatar_cache_total", "Avatar cache lookups"),
        &["result"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// Feed request latency in seconds, by endpoint.
    pub static ref FEED_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ninja_feed_request_duration_seconds",
            "Feed request duration in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(FEED_REQUESTS_TOTAL.clone()),
        Box::new(LOOKUPS_TOTAL.clone()),
        Box::new(AVATAR_CACHE_TOTAL.clone()),
        Box::new(FEED_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        if let Err(e) = REGISTRY.register(c) {
            tracing::warn!("Metric registration skipped: {e}");
        }
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {e}");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_metrics_returns_string() {
        // Registering twice must not panic
        register_metrics();
        register_metrics();
        LOOKUPS_TOTAL.with_label_values(&["found"]).inc();
        let output = gather_metrics();
        assert!(output.contains("ninja_lookups_total"));
    }

    #[test]
    fn test_metric_increments() {
        let before = AVATAR_CACHE_TOTAL.with_label_values(&["hit"]).get();
        AVATAR_CACHE_TOTAL.with_label_values(&["hit"]).inc();
        // Other tests may bump the same counter concurrently
        assert!(AVATAR_CACHE_TOTAL.with_label_values(&["hit"]).get() > before);

        FEED_REQUESTS_TOTAL.with_label_values(&["index", "ok"]).inc();
        FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&["detail"])
            .observe(0.2);
    }
}
