use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Marketplace Router Module
///
/// The project endpoint consumed by the dashboards.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/projects?userId=..&role=..
        // Role-scoped project listing.
        // POST /api/projects
        // Project submission, clients only.
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
}
