use sqlx::{Postgres, QueryBuilder};

use crate::{
    error::{ApiError, ApiResult, FETCH_FAILED},
    identity::Requester,
    models::{Bid, DbId, Project, ProjectListing, Role},
    repository::Repository,
};

/// ProjectScope
///
/// The visibility predicate for one requester. Resolved from the requester's
/// role and profile, then handed to the repository, which either pushes it
/// into SQL (`push_project_filter` / `push_bid_filter`) or evaluates it in
/// memory (`admits_project` / `admits_bid`). Both forms encode the same rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    /// A client: only projects it owns, with every bid on them.
    Owner { client_id: DbId },
    /// A freelancer: public projects plus projects it bid on, with only its own bids.
    Bidder { freelancer_id: DbId },
    /// An admin: everything.
    All,
}

impl ProjectScope {
    /// Appends the project predicate (if any) as a `WHERE` clause.
    /// Expects the projects table aliased as `p`.
    pub fn push_project_filter(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match *self {
            ProjectScope::Owner { client_id } => {
                builder.push(" WHERE p.client_id = ");
                builder.push_bind(client_id);
            }
            ProjectScope::Bidder { freelancer_id } => {
                builder.push(
                    " WHERE (p.is_public = TRUE OR EXISTS (\
                     SELECT 1 FROM bids vb WHERE vb.project_id = p.id AND vb.freelancer_id = ",
                );
                builder.push_bind(freelancer_id);
                builder.push("))");
            }
            ProjectScope::All => {}
        }
    }

    /// Appends the nested-bid restriction as an `AND` term.
    /// Expects a preceding `WHERE` and the bids table aliased as `b`.
    pub fn push_bid_filter(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let ProjectScope::Bidder { freelancer_id } = *self {
            builder.push(" AND b.freelancer_id = ");
            builder.push_bind(freelancer_id);
        }
    }

    /// Whether `project` is visible, given every bid placed on it.
    pub fn admits_project(&self, project: &Project, bids: &[Bid]) -> bool {
        match *self {
            ProjectScope::Owner { client_id } => project.client_id == client_id,
            ProjectScope::Bidder { freelancer_id } => {
                project.is_public
                    || bids
                        .iter()
                        .any(|bid| bid.project_id == project.id && bid.freelancer_id == freelancer_id)
            }
            ProjectScope::All => true,
        }
    }

    /// Whether `bid` may be shown nested under a visible project.
    pub fn admits_bid(&self, bid: &Bid) -> bool {
        match *self {
            ProjectScope::Bidder { freelancer_id } => bid.freelancer_id == freelancer_id,
            ProjectScope::Owner { .. } | ProjectScope::All => true,
        }
    }
}

/// resolve_scope
///
/// Maps a requester to its visibility predicate, resolving the Client or
/// Freelancer profile behind the user id. A missing profile is `NotFound`.
pub async fn resolve_scope(repo: &dyn Repository, requester: &Requester) -> ApiResult<ProjectScope> {
    match requester.role {
        Role::Client => {
            let client = repo
                .find_client_by_user(requester.user_id)
                .await
                .map_err(ApiError::persistence(FETCH_FAILED))?
                .ok_or(ApiError::NotFound("Client"))?;
            Ok(ProjectScope::Owner { client_id: client.id })
        }
        Role::Freelancer => {
            let freelancer = repo
                .find_freelancer_by_user(requester.user_id)
                .await
                .map_err(ApiError::persistence(FETCH_FAILED))?
                .ok_or(ApiError::NotFound("Freelancer"))?;
            Ok(ProjectScope::Bidder {
                freelancer_id: freelancer.id,
            })
        }
        Role::Admin => Ok(ProjectScope::All),
    }
}

/// select_visible_projects
///
/// Lists the projects `requester` may see, most recent first (`created_at`
/// descending, then `id` descending). Read-only.
pub async fn select_visible_projects(
    repo: &dyn Repository,
    requester: &Requester,
) -> ApiResult<Vec<ProjectListing>> {
    let scope = resolve_scope(repo, requester).await?;

    let projects = repo
        .list_projects(&scope)
        .await
        .map_err(ApiError::persistence(FETCH_FAILED))?;

    tracing::debug!(
        user_id = requester.user_id,
        role = %requester.role,
        ?scope,
        count = projects.len(),
        "Resolved visible projects"
    );

    Ok(projects)
}
