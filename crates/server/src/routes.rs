//! Route configuration.

use crate::auth::trace_middleware;
use crate::handlers;
use crate::metrics::{metrics_handler, register_metrics};
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.config.server.max_upload_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/health", get(handlers::health_check))
        // Bearer only
        .route("/roll-api-key", post(handlers::roll_api_key))
        // Bearer + secondary key
        .route(
            "/upload",
            post(handlers::upload_object).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/fetch/{object_id}", get(handlers::fetch_object))
        .route("/list", get(handlers::list_objects));

    let prefix = state.config.server.normalized_api_prefix();
    let mut router = if prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(prefix, api_routes)
    };

    // SECURITY: When enabled, this endpoint MUST be network-restricted
    // to authorized Prometheus scraper IPs only.
    if state.config.server.metrics_enabled {
        register_metrics();
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(middleware::from_fn(trace_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
