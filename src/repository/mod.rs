use crate::{
    models::{Client, DbId, Freelancer, NewProject, ProjectListing, ProjectWithClient},
    visibility::ProjectScope,
};
use async_trait::async_trait;
use std::sync::Arc;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// The persistence contract consumed by the visibility and intake logic.
/// Handlers never see a concrete store: production wires in
/// `PostgresRepository`, tests wire in `InMemoryRepository`.
///
/// Methods return raw `sqlx::Error`s; callers attach the user-facing context.
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` usable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Identity Resolution ---
    async fn find_client_by_user(&self, user_id: DbId) -> Result<Option<Client>, sqlx::Error>;
    async fn find_freelancer_by_user(&self, user_id: DbId)
    -> Result<Option<Freelancer>, sqlx::Error>;

    // --- Projects ---
    /// Projects admitted by `scope`, each with its client, the bids the scope
    /// admits and the total bid count. Ordered `created_at DESC, id DESC`.
    async fn list_projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectListing>, sqlx::Error>;
    /// Persists `project` under `client` and returns it joined with the client.
    async fn insert_project(
        &self,
        client: &Client,
        project: NewProject,
    ) -> Result<ProjectWithClient, sqlx::Error>;

    // --- Lifecycle ---
    /// Releases the underlying connections. Called once, after the server stops.
    async fn close(&self);
}

/// RepositoryState
///
/// The shared handle to the persistence layer stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
