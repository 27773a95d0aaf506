use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, migrate::MigrateError, query_builder::QueryBuilder};

use super::Repository;
use crate::{
    models::{
        Bid, BidView, Client, ClientSummary, DbId, Freelancer, FreelancerSummary, NewProject,
        Project, ProjectListing, ProjectWithClient, UserContact, UserName,
    },
    visibility::ProjectScope,
};

/// Project columns (alias `p`) joined with the owning client (`c`) and its user (`u`).
const PROJECT_COLUMNS: &str = r#"
    p.id, p.client_id, p.title, p.description, p.category, p.budget, p.deadline,
    p.status, p.is_public, p.created_at, p.updated_at,
    c.company AS client_company, u.name AS client_name, u.email AS client_email
"#;

/// Row shape of a project joined with its client and the client's user.
#[derive(FromRow)]
struct ProjectClientRecord {
    #[sqlx(flatten)]
    project: Project,
    client_company: Option<String>,
    client_name: String,
    client_email: String,
}

impl ProjectClientRecord {
    fn into_parts(self) -> (Project, ClientSummary) {
        let client = ClientSummary {
            id: self.project.client_id,
            company: self.client_company,
            user: UserContact {
                name: self.client_name,
                email: self.client_email,
            },
        };
        (self.project, client)
    }
}

#[derive(FromRow)]
struct ProjectListingRecord {
    #[sqlx(flatten)]
    base: ProjectClientRecord,
    bid_count: i64,
}

/// Row shape of a bid joined with the bidding freelancer and its user.
#[derive(FromRow)]
struct BidRecord {
    #[sqlx(flatten)]
    bid: Bid,
    freelancer_title: Option<String>,
    freelancer_name: String,
}

impl From<BidRecord> for BidView {
    fn from(record: BidRecord) -> Self {
        BidView {
            bid: record.bid,
            freelancer: FreelancerSummary {
                title: record.freelancer_title,
                user: UserName {
                    name: record.freelancer_name,
                },
            },
        }
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Owns the process-wide
/// connection pool; `close` drains it at shutdown.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations (`migrations/`).
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Loads the bids admitted by `scope` for the given projects, grouped by project id.
    async fn load_bids(
        &self,
        project_ids: Vec<DbId>,
        scope: &ProjectScope,
    ) -> Result<HashMap<DbId, Vec<BidView>>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT
                b.id, b.project_id, b.freelancer_id, b.amount, b.timeline,
                b.cover_letter, b.status, b.created_at,
                f.title AS freelancer_title, fu.name AS freelancer_name
            FROM bids b
            JOIN freelancers f ON f.id = b.freelancer_id
            JOIN users fu ON fu.id = f.user_id
            WHERE b.project_id = ANY(
            "#,
        );
        builder.push_bind(project_ids);
        builder.push(")");
        scope.push_bid_filter(&mut builder);
        builder.push(" ORDER BY b.created_at DESC, b.id DESC");

        let records = builder
            .build_query_as::<BidRecord>()
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<DbId, Vec<BidView>> = HashMap::new();
        for record in records {
            grouped
                .entry(record.bid.project_id)
                .or_default()
                .push(record.into());
        }
        Ok(grouped)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_client_by_user(&self, user_id: DbId) -> Result<Option<Client>, sqlx::Error> {
        sqlx::query_as::<_, Client>("SELECT id, user_id, company FROM clients WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_freelancer_by_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Freelancer>, sqlx::Error> {
        sqlx::query_as::<_, Freelancer>(
            "SELECT id, user_id, title FROM freelancers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// list_projects
    ///
    /// Two round trips: the scoped project page with its client join and total
    /// bid count, then the admitted bids for exactly those projects. The scope
    /// predicate is pushed through QueryBuilder, so every value is bound.
    async fn list_projects(&self, scope: &ProjectScope) -> Result<Vec<ProjectListing>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT");
        builder.push(PROJECT_COLUMNS);
        builder.push(
            r#",
                (SELECT COUNT(*) FROM bids cb WHERE cb.project_id = p.id) AS bid_count
            FROM projects p
            JOIN clients c ON c.id = p.client_id
            JOIN users u ON u.id = c.user_id
            "#,
        );
        scope.push_project_filter(&mut builder);
        builder.push(" ORDER BY p.created_at DESC, p.id DESC");

        let records = builder
            .build_query_as::<ProjectListingRecord>()
            .fetch_all(&self.pool)
            .await?;

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let project_ids = records.iter().map(|r| r.base.project.id).collect();
        let mut bids = self.load_bids(project_ids, scope).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let (project, client) = record.base.into_parts();
                ProjectListing {
                    bids: bids.remove(&project.id).unwrap_or_default(),
                    bid_count: record.bid_count,
                    project,
                    client,
                }
            })
            .collect())
    }

    /// insert_project
    ///
    /// Inserts and joins in one statement (CTE), so the returned projection is
    /// read in the same snapshot as the write.
    async fn insert_project(
        &self,
        client: &Client,
        project: NewProject,
    ) -> Result<ProjectWithClient, sqlx::Error> {
        let record = sqlx::query_as::<_, ProjectClientRecord>(
            r#"
            WITH p AS (
                INSERT INTO projects (client_id, title, description, category, budget, deadline, is_public)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, client_id, title, description, category, budget, deadline,
                          status, is_public, created_at, updated_at
            )
            SELECT
                p.id, p.client_id, p.title, p.description, p.category, p.budget, p.deadline,
                p.status, p.is_public, p.created_at, p.updated_at,
                c.company AS client_company, u.name AS client_name, u.email AS client_email
            FROM p
            JOIN clients c ON c.id = p.client_id
            JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(client.id)
        .bind(project.title)
        .bind(project.description)
        .bind(project.category)
        .bind(project.budget)
        .bind(project.deadline)
        .bind(project.is_public)
        .fetch_one(&self.pool)
        .await?;

        let (project, client) = record.into_parts();
        Ok(ProjectWithClient { project, client })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
