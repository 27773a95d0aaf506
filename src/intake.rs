use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    error::{ApiError, ApiResult, CREATE_FAILED},
    models::{
        CreateProjectRequest, DbId, FieldError, NewProject, ProjectCategory, ProjectWithClient,
        Role, UserIdInput,
    },
    repository::Repository,
};

// Order in which field errors are reported.
const FIELD_ORDER: [&str; 7] = [
    "userId",
    "title",
    "description",
    "category",
    "budget",
    "deadline",
    "isPublic",
];

/// create_project
///
/// Validates a project submission and persists it for the requesting client.
///
/// 1. Role gate: anything but `CLIENT` (including a missing or non-string role)
///    is `Forbidden`, whatever the rest of the body holds.
/// 2. Field validation: every failing field, mistyped ones included, is
///    collected into one `Validation` error.
/// 3. Client resolution by `userId`: absent is `NotFound("Client")`.
///
/// Nothing is written unless all three pass.
pub async fn create_project(repo: &dyn Repository, body: Value) -> ApiResult<ProjectWithClient> {
    let role = body
        .get("role")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<Role>().ok());
    if role != Some(Role::Client) {
        tracing::warn!(role = ?body.get("role"), "Rejected project submission from non-client");
        return Err(ApiError::Forbidden);
    }

    let (request, mistyped) = decode_submission(body);
    let (user_id, draft) = check(request, mistyped)?;

    let client = repo
        .find_client_by_user(user_id)
        .await
        .map_err(ApiError::persistence(CREATE_FAILED))?
        .ok_or(ApiError::NotFound("Client"))?;

    let created = repo
        .insert_project(&client, draft)
        .await
        .map_err(ApiError::persistence(CREATE_FAILED))?;

    tracing::info!(
        project_id = created.project.id,
        client_id = client.id,
        category = %created.project.category,
        "Project created"
    );

    Ok(created)
}

/// decode_submission
///
/// Reads the raw JSON body one field at a time. A field holding the wrong
/// JSON type is left unset and reported as an `invalid_type` error for that
/// field, so it is aggregated with the rule violations instead of failing
/// the whole body. `null` counts as absent. A non-object body decodes to an
/// empty request.
pub fn decode_submission(body: Value) -> (CreateProjectRequest, Vec<FieldError>) {
    let Value::Object(mut fields) = body else {
        return (CreateProjectRequest::default(), Vec::new());
    };
    let mut mistyped = Vec::new();

    let request = CreateProjectRequest {
        user_id: take(&mut fields, "userId", "userId must be a positive integer", &mut mistyped),
        role: fields.remove("role").and_then(|role| role.as_str().map(str::to_string)),
        title: take(&mut fields, "title", "Title must be a string", &mut mistyped),
        description: take(&mut fields, "description", "Description must be a string", &mut mistyped),
        category: take(&mut fields, "category", "Category must be a string", &mut mistyped),
        budget: take(&mut fields, "budget", "Budget must be a number", &mut mistyped),
        deadline: take(&mut fields, "deadline", "Deadline must be a string", &mut mistyped),
        is_public: take(&mut fields, "isPublic", "isPublic must be a boolean", &mut mistyped),
    };

    (request, mistyped)
}

fn take<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    name: &str,
    message: &str,
    mistyped: &mut Vec<FieldError>,
) -> Option<T> {
    match fields.remove(name) {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                mistyped.push(FieldError {
                    field: name.to_string(),
                    code: "invalid_type".to_string(),
                    message: message.to_string(),
                });
                None
            }
        },
    }
}

/// normalize
///
/// Runs the field validators and converts the loosely-typed payload into the
/// requester's user id and a [`NewProject`]. The deadline is converted to UTC.
pub fn normalize(request: CreateProjectRequest) -> ApiResult<(DbId, NewProject)> {
    check(request, Vec::new())
}

// Merges decode-time type errors with the validator's rule errors. A mistyped
// field reports only its type error.
fn check(
    request: CreateProjectRequest,
    mut errors: Vec<FieldError>,
) -> ApiResult<(DbId, NewProject)> {
    if let Err(rules) = request.validate() {
        let rules: Vec<FieldError> = field_errors(&rules)
            .into_iter()
            .filter(|rule| !errors.iter().any(|typed| typed.field == rule.field))
            .collect();
        errors.extend(rules);
    }
    if !errors.is_empty() {
        sort_by_field_order(&mut errors);
        return Err(ApiError::Validation(errors));
    }

    let user_id = request.user_id.as_ref().and_then(UserIdInput::resolve);
    let category = request.category.as_deref().and_then(|raw| raw.parse::<ProjectCategory>().ok());
    let deadline = match request.deadline.as_deref() {
        Some(raw) => Some(parse_deadline(raw).ok_or_else(|| invalid("deadline"))?),
        None => None,
    };

    let (Some(user_id), Some(title), Some(description), Some(category)) =
        (user_id, request.title, request.description, category)
    else {
        // Unreachable once `validate` passed; kept total for the type checker.
        return Err(invalid("payload"));
    };

    Ok((
        user_id,
        NewProject {
            title,
            description,
            category,
            budget: request.budget,
            deadline,
            is_public: request.is_public.unwrap_or(true),
        },
    ))
}

pub(crate) fn validate_user_id(value: &UserIdInput) -> Result<(), ValidationError> {
    match value.resolve() {
        Some(_) => Ok(()),
        None => Err(rejection("invalid_user_id", "userId must be a positive integer")),
    }
}

pub(crate) fn validate_category(value: &str) -> Result<(), ValidationError> {
    match value.parse::<ProjectCategory>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let allowed: Vec<&str> = ProjectCategory::ALL.iter().map(ProjectCategory::as_str).collect();
            Err(rejection(
                "invalid_enum_value",
                format!("Invalid category, expected one of {}", allowed.join(", ")),
            ))
        }
    }
}

pub(crate) fn validate_deadline(value: &str) -> Result<(), ValidationError> {
    match parse_deadline(value) {
        Some(_) => Ok(()),
        None => Err(rejection("invalid_datetime", "Deadline must be an ISO 8601 date-time")),
    }
}

fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|deadline| deadline.with_timezone(&Utc))
}

fn rejection(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn invalid(field: &str) -> ApiError {
    ApiError::Validation(vec![FieldError {
        field: field.to_string(),
        code: "invalid".to_string(),
        message: format!("Invalid {field}"),
    }])
}

/// Flattens `validator` output into wire-level field errors, camelCasing
/// field names and ordering them by payload position.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut result = Vec::new();
    for (field, errors) in errors.field_errors() {
        let field = camel_case(&field.to_string());
        for error in errors.iter() {
            result.push(FieldError {
                field: field.clone(),
                code: error.code.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Validation failed for field '{field}'")),
            });
        }
    }
    sort_by_field_order(&mut result);
    result
}

fn sort_by_field_order(errors: &mut [FieldError]) {
    errors.sort_by_key(|error| {
        FIELD_ORDER
            .iter()
            .position(|name| *name == error.field)
            .unwrap_or(FIELD_ORDER.len())
    });
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
