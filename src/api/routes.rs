//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, dispatch_handler, drain_outbox_handler, get_handler, health_handler,
    outbox_handler, set_handler, state_handler, stats_handler, stores_handler, ApiState,
};

/// Creates the admin router.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // `/cache/stats` is matched before `/cache/:key`
    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", put(set_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stores", get(stores_handler))
        .route("/stores/:name", get(state_handler))
        .route("/stores/:name/dispatch", post(dispatch_handler))
        .route("/outbox", get(outbox_handler))
        .route("/outbox/drain", post(drain_outbox_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
