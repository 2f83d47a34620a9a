//! API Routes
//!
//! Configures the Axum router with the peer endpoint and operational endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    fetch_handler, health_handler, malformed_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// The peer endpoint is mounted only under `state.base_path`, so requests
/// outside the namespace never reach a group. Inside the namespace, a path
/// naming no group or no key is answered with 400.
pub fn create_router(state: AppState) -> Router {
    let base = state.base_path.to_string();

    Router::new()
        .route(&format!("{}:group/*key", base), get(fetch_handler))
        .route(&format!("{}:group/", base), get(fetch_handler))
        .route(&format!("{}:group", base), get(malformed_handler))
        .route(&base, get(malformed_handler))
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
