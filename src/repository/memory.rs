use std::sync::{
    PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Repository;
use crate::{
    models::{
        Bid, BidStatus, BidView, Client, ClientSummary, DbId, Freelancer, FreelancerSummary,
        NewProject, Project, ProjectListing, ProjectStatus, ProjectWithClient, Role, User,
        UserContact, UserName,
    },
    visibility::ProjectScope,
};

#[derive(Default)]
struct Store {
    users: Vec<User>,
    clients: Vec<Client>,
    freelancers: Vec<Freelancer>,
    projects: Vec<Project>,
    bids: Vec<Bid>,
    last_id: DbId,
}

impl Store {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, id: DbId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn client_summary(&self, client_id: DbId) -> Option<ClientSummary> {
        let client = self.clients.iter().find(|c| c.id == client_id)?;
        let user = self.user(client.user_id)?;
        Some(ClientSummary {
            id: client.id,
            company: client.company.clone(),
            user: UserContact {
                name: user.name.clone(),
                email: user.email.clone(),
            },
        })
    }

    fn bid_view(&self, bid: &Bid) -> Option<BidView> {
        let freelancer = self.freelancers.iter().find(|f| f.id == bid.freelancer_id)?;
        let user = self.user(freelancer.user_id)?;
        Some(BidView {
            bid: bid.clone(),
            freelancer: FreelancerSummary {
                title: freelancer.title.clone(),
                user: UserName {
                    name: user.name.clone(),
                },
            },
        })
    }
}

/// InMemoryRepository
///
/// A `Repository` over plain vectors, used by the test suites and for running
/// the API without a database. Evaluates `ProjectScope` in memory with the
/// same rules the Postgres queries encode.
///
/// The `add_*` seeding helpers bypass validation, mirroring rows written by
/// other services directly into the store.
pub struct InMemoryRepository {
    store: RwLock<Store>,
    /// When true, every trait method returns a simulated store failure.
    should_fail: AtomicBool,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::default()),
            should_fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), sqlx::Error> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    // --- Seeding ---

    pub fn add_user(&self, name: &str, email: &str, role: Role) -> User {
        let mut store = self.write();
        let user = User {
            id: store.next_id(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        store.users.push(user.clone());
        user
    }

    pub fn add_client(&self, user_id: DbId, company: Option<&str>) -> Client {
        let mut store = self.write();
        let client = Client {
            id: store.next_id(),
            user_id,
            company: company.map(str::to_string),
        };
        store.clients.push(client.clone());
        client
    }

    pub fn add_freelancer(&self, user_id: DbId, title: Option<&str>) -> Freelancer {
        let mut store = self.write();
        let freelancer = Freelancer {
            id: store.next_id(),
            user_id,
            title: title.map(str::to_string),
        };
        store.freelancers.push(freelancer.clone());
        freelancer
    }

    /// Stores a project with an explicit creation time.
    pub fn add_project(&self, client_id: DbId, project: NewProject, created_at: DateTime<Utc>) -> Project {
        let mut store = self.write();
        let project = Project {
            id: store.next_id(),
            client_id,
            title: project.title,
            description: project.description,
            category: project.category,
            budget: project.budget,
            deadline: project.deadline,
            status: ProjectStatus::Open,
            is_public: project.is_public,
            created_at,
            updated_at: created_at,
        };
        store.projects.push(project.clone());
        project
    }

    pub fn add_bid(
        &self,
        project_id: DbId,
        freelancer_id: DbId,
        amount: f64,
        cover_letter: Option<&str>,
    ) -> Bid {
        let mut store = self.write();
        let bid = Bid {
            id: store.next_id(),
            project_id,
            freelancer_id,
            amount,
            timeline: None,
            cover_letter: cover_letter.map(str::to_string),
            status: BidStatus::Pending,
            created_at: Utc::now(),
        };
        store.bids.push(bid.clone());
        bid
    }

    pub fn project_count(&self) -> usize {
        self.read().projects.len()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_client_by_user(&self, user_id: DbId) -> Result<Option<Client>, sqlx::Error> {
        self.check_available()?;
        Ok(self.read().clients.iter().find(|c| c.user_id == user_id).cloned())
    }

    async fn find_freelancer_by_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Freelancer>, sqlx::Error> {
        self.check_available()?;
        Ok(self
            .read()
            .freelancers
            .iter()
            .find(|f| f.user_id == user_id)
            .cloned())
    }

    async fn list_projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectListing>, sqlx::Error> {
        self.check_available()?;
        let store = self.read();

        let mut visible: Vec<&Project> = store
            .projects
            .iter()
            .filter(|project| scope.admits_project(project, &store.bids))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        visible
            .into_iter()
            .map(|project| -> Result<ProjectListing, sqlx::Error> {
                let client = store
                    .client_summary(project.client_id)
                    .ok_or(sqlx::Error::RowNotFound)?;

                let mut on_project: Vec<&Bid> =
                    store.bids.iter().filter(|bid| bid.project_id == project.id).collect();
                let bid_count = on_project.len() as i64;
                on_project.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

                let bids = on_project
                    .into_iter()
                    .filter(|bid| scope.admits_bid(bid))
                    .map(|bid| store.bid_view(bid).ok_or(sqlx::Error::RowNotFound))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(ProjectListing {
                    project: project.clone(),
                    client,
                    bids,
                    bid_count,
                })
            })
            .collect()
    }

    async fn insert_project(
        &self,
        client: &Client,
        project: NewProject,
    ) -> Result<ProjectWithClient, sqlx::Error> {
        self.check_available()?;
        let summary = self
            .read()
            .client_summary(client.id)
            .ok_or(sqlx::Error::RowNotFound)?;
        let project = self.add_project(client.id, project, Utc::now());
        Ok(ProjectWithClient {
            project,
            client: summary,
        })
    }

    async fn close(&self) {}
}
