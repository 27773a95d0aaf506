//! Requester identity resolved at the HTTP boundary.
//!
//! The wire carries `userId` and `role` as loosely-typed strings. They are
//! parsed here, once, into a [`Requester`] so the visibility and intake logic
//! only ever sees a positive id and a closed [`Role`].

use crate::{
    error::ApiError,
    models::{DbId, Role, UserIdInput},
};

/// Requester
///
/// Who is asking: the user id and the role they act under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: DbId,
    pub role: Role,
}

impl Requester {
    pub fn new(user_id: DbId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Parses the `userId` / `role` query parameters of a listing request.
    ///
    /// Blank values count as absent. A `userId` that is not a positive integer
    /// is treated as absent too, so it reports `MissingParameter`. A present
    /// but unknown role is `InvalidRole`.
    pub fn from_query(user_id: Option<&str>, role: Option<&str>) -> Result<Self, ApiError> {
        let user_id = user_id.map(str::trim).filter(|raw| !raw.is_empty());
        let role = role.map(str::trim).filter(|raw| !raw.is_empty());

        let (Some(user_id), Some(role)) = (user_id, role) else {
            return Err(ApiError::MissingParameter);
        };

        let user_id = parse_user_id(user_id).ok_or(ApiError::MissingParameter)?;
        let role = role.parse::<Role>().map_err(|_| ApiError::InvalidRole)?;

        Ok(Self { user_id, role })
    }
}

/// Parses a positive integer user id. Zero, negatives and non-numeric input yield `None`.
pub fn parse_user_id(raw: &str) -> Option<DbId> {
    raw.trim().parse::<DbId>().ok().filter(|id| *id > 0)
}

impl UserIdInput {
    /// The positive id this input denotes, if any.
    pub fn resolve(&self) -> Option<DbId> {
        match self {
            UserIdInput::Number(id) => Some(*id).filter(|id| *id > 0),
            UserIdInput::Text(raw) => parse_user_id(raw),
        }
    }
}
