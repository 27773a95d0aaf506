use axum::{Router, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod intake;
pub mod models;
pub mod repository;
pub mod visibility;

// Module for routing segregation (Public, Marketplace API).
pub mod routes;
use routes::{api, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the marketplace API, generated from the
/// `#[utoipa::path]` handlers and `ToSchema` models. Served at
/// `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_projects, handlers::create_project),
    components(
        schemas(
            models::Role, models::ProjectCategory, models::ProjectStatus, models::BidStatus,
            models::Project, models::Bid, models::BidView, models::ClientSummary,
            models::FreelancerSummary, models::UserContact, models::UserName,
            models::ProjectListing, models::ProjectWithClient, models::UserIdInput,
            models::CreateProjectRequest, models::ProjectListResponse,
            models::ProjectCreatedResponse, models::FieldError, models::ErrorResponse,
        )
    ),
    tags(
        (name = "freelance-portal", description = "Freelance Marketplace Projects API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, cloneable state handed to every handler. The repository is injected
/// here rather than held globally, so tests swap in `InMemoryRepository`.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: persistence behind the `Repository` trait.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

/// create_router
///
/// Assembles the routing table, the documentation UI and the observability
/// layers, and binds the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: the marketing site is served from a different origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(api::api_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Generate an x-request-id for requests that lack one.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Wrap each request in a span carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo the request id back on the response.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of one request shares its
/// `req_id`, method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
