use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::{ErrorResponse, FieldError};

/// Opaque message returned when a listing fails in the store.
pub const FETCH_FAILED: &str = "Failed to fetch projects";
/// Opaque message returned when a project insert fails in the store.
pub const CREATE_FAILED: &str = "Failed to create project";

/// ApiError
///
/// Every failure the marketplace API can report. Each variant maps to exactly
/// one HTTP status; see the `IntoResponse` impl below.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// `userId` or `role` absent from a listing request.
    #[error("Missing userId or role")]
    MissingParameter,

    /// `role` present but not one of CLIENT, FREELANCER, ADMIN.
    #[error("Invalid role")]
    InvalidRole,

    /// The requester's Client or Freelancer profile does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Project creation attempted by a non-client.
    #[error("Only clients can create projects")]
    Forbidden,

    /// One entry per failing field of a creation payload.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// The store rejected or failed the operation. `context` is the message
    /// shown to the caller; `source` is only logged.
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Convenience alias for domain and handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Builds a `map_err` adapter that wraps a store error with the caller-facing message.
    pub fn persistence(context: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |source| ApiError::Persistence { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter | ApiError::InvalidRole | ApiError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let ApiError::Persistence { context, source } = &self {
            tracing::error!(error = ?source, "{}", context);
        }

        let body = match self {
            ApiError::Validation(details) => ErrorResponse {
                error: "Validation failed".to_string(),
                details,
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}
