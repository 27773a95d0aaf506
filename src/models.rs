use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Primary key type shared by every marketplace table (`BIGSERIAL`).
pub type DbId = i64;

// --- Closed Enumerations ---

/// Role
///
/// The RBAC role carried by every request. Parsed from the wire at the boundary
/// (see `identity`), so downstream code matches on a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Client,
    Freelancer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Freelancer => "FREELANCER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a wire value does not name one of the closed enum variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant `{}`", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for Role {
    type Err = UnknownVariant;

    // Matching is exact: "client" is not a role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLIENT" => Ok(Role::Client),
            "FREELANCER" => Ok(Role::Freelancer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// ProjectCategory
///
/// The fixed catalogue of engineering services a project can be posted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ProjectCategory {
    Iot,
    Ai,
    Website,
    Software,
    MobileApp,
    Blockchain,
    Cybersecurity,
    DataAnalytics,
    Other,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 9] = [
        ProjectCategory::Iot,
        ProjectCategory::Ai,
        ProjectCategory::Website,
        ProjectCategory::Software,
        ProjectCategory::MobileApp,
        ProjectCategory::Blockchain,
        ProjectCategory::Cybersecurity,
        ProjectCategory::DataAnalytics,
        ProjectCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Iot => "IOT",
            ProjectCategory::Ai => "AI",
            ProjectCategory::Website => "WEBSITE",
            ProjectCategory::Software => "SOFTWARE",
            ProjectCategory::MobileApp => "MOBILE_APP",
            ProjectCategory::Blockchain => "BLOCKCHAIN",
            ProjectCategory::Cybersecurity => "CYBERSECURITY",
            ProjectCategory::DataAnalytics => "DATA_ANALYTICS",
            ProjectCategory::Other => "OTHER",
        }
    }
}

impl FromStr for ProjectCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a posted project. New projects start `OPEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ProjectStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "bid_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum BidStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Identity record from the `users` table. The role is fixed for the
/// lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Client
///
/// One-to-one profile of a CLIENT user. Owns the projects it posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Client {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number")]
    pub user_id: DbId,
    pub company: Option<String>,
}

/// Freelancer
///
/// One-to-one profile of a FREELANCER user. Owns the bids it places.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Freelancer {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number")]
    pub user_id: DbId,
    // Professional headline, e.g. "Embedded Firmware Engineer".
    pub title: Option<String>,
}

/// Project
///
/// A project posted by a client on the marketplace (`projects` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Project {
    #[ts(type = "number")]
    pub id: DbId,
    // FK to clients.id (owner).
    #[ts(type = "number")]
    pub client_id: DbId,
    pub title: String,
    pub description: String,
    pub category: ProjectCategory,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    // Public projects are listed to every freelancer.
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bid
///
/// A freelancer's proposal against a project (`bids` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bid {
    #[ts(type = "number")]
    pub id: DbId,
    #[ts(type = "number")]
    pub project_id: DbId,
    #[ts(type = "number")]
    pub freelancer_id: DbId,
    pub amount: f64,
    pub timeline: Option<String>,
    pub cover_letter: Option<String>,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

// --- Display Projections (Output) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserContact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserName {
    pub name: String,
}

/// Owning client of a project, with the contact details of its user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ClientSummary {
    #[ts(type = "number")]
    pub id: DbId,
    pub company: Option<String>,
    pub user: UserContact,
}

/// Bidding freelancer as shown next to a bid: headline and display name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FreelancerSummary {
    pub title: Option<String>,
    pub user: UserName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Bid,
    pub freelancer: FreelancerSummary,
}

/// ProjectWithClient
///
/// A project joined with its owning client. Returned by project creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProjectWithClient {
    #[serde(flatten)]
    pub project: Project,
    pub client: ClientSummary,
}

/// ProjectListing
///
/// One entry of `GET /api/projects`. `bids` holds the bids the requester may
/// see; `bid_count` always counts every bid on the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProjectListing {
    #[serde(flatten)]
    pub project: Project,
    pub client: ClientSummary,
    pub bids: Vec<BidView>,
    #[ts(type = "number")]
    pub bid_count: i64,
}

/// NewProject
///
/// A validated, normalized project submission ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub category: ProjectCategory,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_public: bool,
}

// --- Request Payloads (Input Schemas) ---

/// UserIdInput
///
/// Browser clients send `userId` either as a JSON number or as the numeric
/// string they read from a query parameter; both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UserIdInput {
    Number(i64),
    Text(String),
}

/// CreateProjectRequest
///
/// Body of `POST /api/projects`. Built field by field from the raw JSON by
/// `intake::decode_submission`, so a field of the wrong JSON type is reported
/// as that field's error alongside the rule violations below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(
        required(message = "userId is required"),
        custom(function = "crate::intake::validate_user_id")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserIdInput>,

    // Checked before any field validation; only CLIENT may submit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[validate(
        required(message = "Title is required"),
        length(min = 1, message = "Title is required")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = 10, message = "Description must be at least 10 characters")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[validate(
        required(message = "Category is required"),
        custom(function = "crate::intake::validate_category")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[validate(range(exclusive_min = 0.0, message = "Budget must be a positive number"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,

    /// RFC 3339 date-time, e.g. `2025-06-30T17:00:00Z`.
    #[validate(custom(function = "crate::intake::validate_deadline"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    /// Defaults to `true` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

// --- Response Payloads (Output Schemas) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectListing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProjectCreatedResponse {
    pub message: String,
    pub project: ProjectWithClient,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// ErrorResponse
///
/// JSON body of every non-2xx response. `details` is only present for
/// validation failures.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}
