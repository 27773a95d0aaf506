#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use freelance_portal::{
    AppConfig, AppState, InMemoryRepository,
    models::{Bid, Client, DbId, Freelancer, NewProject, Project, ProjectCategory, Role, User},
};
use std::sync::Arc;

/// Users, profiles, projects and bids seeded into an `InMemoryRepository`.
///
/// Projects, oldest first:
/// - `alice_public`   (alice, public)  bids: frank, grace
/// - `alice_private`  (alice, private) no bids
/// - `bob_public`     (bob, public)    bids: grace
/// - `bob_private`    (bob, private)   bids: frank
pub struct Marketplace {
    pub admin: User,
    pub alice: User,
    pub alice_client: Client,
    pub bob: User,
    pub bob_client: Client,
    pub frank: User,
    pub frank_freelancer: Freelancer,
    pub grace: User,
    pub grace_freelancer: Freelancer,
    // A user with neither a client nor a freelancer profile.
    pub nobody: User,
    pub alice_public: Project,
    pub alice_private: Project,
    pub bob_public: Project,
    pub bob_private: Project,
    pub frank_on_alice: Bid,
    pub grace_on_alice: Bid,
    pub grace_on_bob: Bid,
    pub frank_on_bob_private: Bid,
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

pub fn draft(title: &str, category: ProjectCategory, is_public: bool) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: format!("{title}: detailed scope of work for the engagement"),
        category,
        budget: Some(2500.0),
        deadline: None,
        is_public,
    }
}

pub fn seed_marketplace(repo: &InMemoryRepository) -> Marketplace {
    let admin = repo.add_user("Ada Admin", "ada@example.com", Role::Admin);

    let alice = repo.add_user("Alice Client", "alice@example.com", Role::Client);
    let alice_client = repo.add_client(alice.id, Some("Acme Sensors"));
    let bob = repo.add_user("Bob Client", "bob@example.com", Role::Client);
    let bob_client = repo.add_client(bob.id, None);

    let frank = repo.add_user("Frank Freelancer", "frank@example.com", Role::Freelancer);
    let frank_freelancer = repo.add_freelancer(frank.id, Some("Firmware Engineer"));
    let grace = repo.add_user("Grace Freelancer", "grace@example.com", Role::Freelancer);
    let grace_freelancer = repo.add_freelancer(grace.id, Some("PCB Designer"));

    let nobody = repo.add_user("No Profile", "nobody@example.com", Role::Client);

    let t0 = base_time();
    let alice_public = repo.add_project(
        alice_client.id,
        draft("LoRa gateway firmware", ProjectCategory::Iot, true),
        t0,
    );
    let alice_private = repo.add_project(
        alice_client.id,
        draft("Edge inference prototype", ProjectCategory::Ai, false),
        t0 + Duration::minutes(1),
    );
    let bob_public = repo.add_project(
        bob_client.id,
        draft("Company website refresh", ProjectCategory::Website, true),
        t0 + Duration::minutes(2),
    );
    let bob_private = repo.add_project(
        bob_client.id,
        draft("Fleet tracking app", ProjectCategory::MobileApp, false),
        t0 + Duration::minutes(3),
    );

    let frank_on_alice = repo.add_bid(alice_public.id, frank_freelancer.id, 2400.0, Some("Frank's pitch"));
    let grace_on_alice = repo.add_bid(alice_public.id, grace_freelancer.id, 2100.0, Some("Grace's pitch"));
    let grace_on_bob = repo.add_bid(bob_public.id, grace_freelancer.id, 900.0, None);
    let frank_on_bob_private = repo.add_bid(bob_private.id, frank_freelancer.id, 4000.0, None);

    Marketplace {
        admin,
        alice,
        alice_client,
        bob,
        bob_client,
        frank,
        frank_freelancer,
        grace,
        grace_freelancer,
        nobody,
        alice_public,
        alice_private,
        bob_public,
        bob_private,
        frank_on_alice,
        grace_on_alice,
        grace_on_bob,
        frank_on_bob_private,
    }
}

pub fn test_state(repo: Arc<InMemoryRepository>) -> AppState {
    AppState {
        repo,
        config: AppConfig::default(),
    }
}

pub fn ids(projects: &[freelance_portal::models::ProjectListing]) -> Vec<DbId> {
    projects.iter().map(|listing| listing.project.id).collect()
}
