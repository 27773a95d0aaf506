use crate::{
    AppState,
    error::{ApiError, ApiResult},
    identity::Requester,
    intake,
    models::{
        CreateProjectRequest, ErrorResponse, FieldError, ProjectCreatedResponse, ProjectListResponse,
    },
    visibility,
};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;

// --- Query Structs ---

/// ProjectQuery
///
/// Query parameters of `GET /api/projects`. Kept as raw strings so that a
/// missing value and an unknown role can be told apart and reported distinctly.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProjectQuery {
    /// Positive integer id of the requesting user.
    pub user_id: Option<String>,
    /// One of CLIENT, FREELANCER, ADMIN.
    pub role: Option<String>,
}

// --- Handlers ---

/// list_projects
///
/// Lists the projects visible to the requester:
/// - CLIENT: own projects, with all bids.
/// - FREELANCER: public projects and projects bid on, with only the freelancer's own bids.
/// - ADMIN: every project.
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Visible projects, most recent first", body = ProjectListResponse),
        (status = 400, description = "Missing userId or role / Invalid role", body = ErrorResponse),
        (status = 404, description = "Client or Freelancer not found", body = ErrorResponse),
        (status = 500, description = "Failed to fetch projects", body = ErrorResponse)
    )
)]
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<ProjectListResponse>> {
    let requester = Requester::from_query(query.user_id.as_deref(), query.role.as_deref())?;
    let projects = visibility::select_visible_projects(state.repo.as_ref(), &requester).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// create_project
///
/// Posts a new project on behalf of a client. Only `CLIENT` may post; all
/// field failures are returned together under `details`.
///
/// The body is taken as raw JSON so the role gate runs before any field is
/// typed. Only a body that is not JSON at all is reported as a validation
/// failure on the `body` field.
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created", body = ProjectCreatedResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Only clients can create projects", body = ErrorResponse),
        (status = 404, description = "Client not found", body = ErrorResponse),
        (status = 500, description = "Failed to create project", body = ErrorResponse)
    )
)]
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ProjectCreatedResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        ApiError::Validation(vec![FieldError {
            field: "body".to_string(),
            code: "invalid_body".to_string(),
            message: rejection.body_text(),
        }])
    })?;

    let project = intake::create_project(state.repo.as_ref(), body).await?;

    Ok(Json(ProjectCreatedResponse {
        message: "Project created successfully".to_string(),
        project,
    }))
}
