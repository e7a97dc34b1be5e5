//! Prometheus metrics for the Coffer server.
//!
//! # Security Note
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! Metrics carry no principal identifiers or object names, but they do expose
//! aggregate usage. Restrict the endpoint to scraper IPs at the
//! infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static UPLOADS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("coffer_uploads_total", "Total number of objects stored")
        .expect("metric creation failed")
});

pub static BYTES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("coffer_bytes_uploaded_total", "Total bytes stored")
        .expect("metric creation failed")
});

pub static FETCHES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new("coffer_fetches_total", "Total number of objects served")
        .expect("metric creation failed")
});

pub static KEY_ROTATIONS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "coffer_secondary_key_rotations_total",
        "Total number of secondary key rotations",
    )
    .expect("metric creation failed")
});

pub static AUTH_FAILURES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "coffer_auth_failures_total",
            "Rejected requests by failing authentication factor",
        ),
        &["factor"],
    )
    .expect("metric creation failed")
});

pub static STORAGE_FAULTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("coffer_storage_faults_total", "Storage faults by kind"),
        &["kind"],
    )
    .expect("metric creation failed")
});

pub static UPLOAD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "coffer_upload_duration_seconds",
            "Time taken to persist and catalog an upload",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so routers built repeatedly in tests can call it freely.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(UPLOADS_TOTAL.clone()),
            Box::new(BYTES_UPLOADED.clone()),
            Box::new(FETCHES_TOTAL.clone()),
            Box::new(KEY_ROTATIONS.clone()),
            Box::new(AUTH_FAILURES.clone()),
            Box::new(STORAGE_FAULTS.clone()),
            Box::new(UPLOAD_DURATION.clone()),
        ];
        for collector in collectors {
            REGISTRY
                .register(collector)
                .expect("metric registration failed");
        }
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Record a rejected request.
pub fn record_auth_failure(factor: &str) {
    AUTH_FAILURES.with_label_values(&[factor]).inc();
}

/// Record a storage fault.
pub fn record_storage_fault(kind: &str) {
    STORAGE_FAULTS.with_label_values(&[kind]).inc();
}
