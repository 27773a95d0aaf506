use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints with no identity and no data access.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and container orchestration.
        .route("/health", get(|| async { "ok" }))
}
