mod common;

use assert_matches::assert_matches;
use common::{base_time, draft, seed_marketplace};
use freelance_portal::{
    ApiError, InMemoryRepository,
    identity::{Requester, parse_user_id},
    intake,
    models::{CreateProjectRequest, ProjectCategory, Role, UserIdInput},
    visibility::{self, ProjectScope},
};
use sqlx::{Postgres, QueryBuilder};

// --- identity ---

#[test]
fn test_requester_from_query() {
    assert_eq!(
        Requester::from_query(Some("42"), Some("FREELANCER")).unwrap(),
        Requester::new(42, Role::Freelancer)
    );
    assert_eq!(
        Requester::from_query(Some(" 7 "), Some(" ADMIN ")).unwrap(),
        Requester::new(7, Role::Admin)
    );

    assert_matches!(Requester::from_query(None, None), Err(ApiError::MissingParameter));
    assert_matches!(Requester::from_query(Some(""), Some("CLIENT")), Err(ApiError::MissingParameter));
    assert_matches!(Requester::from_query(Some("abc"), Some("CLIENT")), Err(ApiError::MissingParameter));
    assert_matches!(Requester::from_query(Some("-3"), Some("CLIENT")), Err(ApiError::MissingParameter));
    assert_matches!(Requester::from_query(Some("3"), Some("Client")), Err(ApiError::InvalidRole));
}

#[test]
fn test_parse_user_id_accepts_positive_integers_only() {
    assert_eq!(parse_user_id("1"), Some(1));
    assert_eq!(parse_user_id("0"), None);
    assert_eq!(parse_user_id("1.5"), None);
    assert_eq!(parse_user_id(""), None);
}

// --- intake::normalize ---

fn complete_request() -> CreateProjectRequest {
    CreateProjectRequest {
        user_id: Some(UserIdInput::Text("9".to_string())),
        role: Some("CLIENT".to_string()),
        title: Some("Threat model review".to_string()),
        description: Some("Review the threat model of a payments gateway".to_string()),
        category: Some("CYBERSECURITY".to_string()),
        budget: None,
        deadline: Some("2025-12-01T00:00:00Z".to_string()),
        is_public: Some(false),
    }
}

#[test]
fn test_normalize_produces_typed_project() {
    let (user_id, project) = intake::normalize(complete_request()).unwrap();

    assert_eq!(user_id, 9);
    assert_eq!(project.category, ProjectCategory::Cybersecurity);
    assert!(!project.is_public);
    assert_eq!(project.deadline.unwrap().to_rfc3339(), "2025-12-01T00:00:00+00:00");
}

#[test]
fn test_normalize_rejects_bad_user_id_and_lowercase_category() {
    let mut request = complete_request();
    request.user_id = Some(UserIdInput::Number(-1));
    request.category = Some("cybersecurity".to_string());

    let details = match intake::normalize(request) {
        Err(ApiError::Validation(details)) => details,
        other => panic!("expected validation failure, got {other:?}"),
    };

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].field, "userId");
    assert_eq!(details[0].code, "invalid_user_id");
    assert_eq!(details[1].field, "category");
}

#[test]
fn test_normalize_reports_missing_required_fields() {
    let details = match intake::normalize(CreateProjectRequest::default()) {
        Err(ApiError::Validation(details)) => details,
        other => panic!("expected validation failure, got {other:?}"),
    };

    let fields: Vec<&str> = details.iter().map(|detail| detail.field.as_str()).collect();
    assert_eq!(fields, vec!["userId", "title", "description", "category"]);
    assert!(details.iter().all(|detail| detail.code == "required"));
}

// --- visibility ---

#[test]
fn test_scope_predicates_in_memory() {
    let repo = InMemoryRepository::new();
    let market = seed_marketplace(&repo);
    let bids = vec![
        market.frank_on_alice.clone(),
        market.grace_on_alice.clone(),
        market.grace_on_bob.clone(),
        market.frank_on_bob_private.clone(),
    ];

    let owner = ProjectScope::Owner {
        client_id: market.bob_client.id,
    };
    assert!(owner.admits_project(&market.bob_private, &bids));
    assert!(!owner.admits_project(&market.alice_public, &bids));
    assert!(owner.admits_bid(&market.frank_on_alice));

    let grace = ProjectScope::Bidder {
        freelancer_id: market.grace_freelancer.id,
    };
    assert!(grace.admits_project(&market.alice_public, &bids));
    assert!(!grace.admits_project(&market.bob_private, &bids));
    assert!(!grace.admits_project(&market.alice_private, &bids));
    assert!(grace.admits_bid(&market.grace_on_bob));
    assert!(!grace.admits_bid(&market.frank_on_alice));

    let frank = ProjectScope::Bidder {
        freelancer_id: market.frank_freelancer.id,
    };
    assert!(frank.admits_project(&market.bob_private, &bids));

    assert!(ProjectScope::All.admits_project(&market.alice_private, &[]));
}

#[test]
fn test_scope_sql_filters() {
    let mut owner = QueryBuilder::<Postgres>::new("SELECT p.id FROM projects p");
    ProjectScope::Owner { client_id: 3 }.push_project_filter(&mut owner);
    assert_eq!(owner.sql(), "SELECT p.id FROM projects p WHERE p.client_id = $1");

    let mut bidder = QueryBuilder::<Postgres>::new("SELECT p.id FROM projects p");
    ProjectScope::Bidder { freelancer_id: 5 }.push_project_filter(&mut bidder);
    let sql = bidder.sql();
    assert!(sql.contains("p.is_public = TRUE OR EXISTS"));
    assert!(sql.ends_with("vb.freelancer_id = $1))"));

    let mut all = QueryBuilder::<Postgres>::new("SELECT p.id FROM projects p");
    ProjectScope::All.push_project_filter(&mut all);
    assert_eq!(all.sql(), "SELECT p.id FROM projects p");

    let mut bids = QueryBuilder::<Postgres>::new("SELECT b.id FROM bids b WHERE b.project_id = 1");
    ProjectScope::Bidder { freelancer_id: 5 }.push_bid_filter(&mut bids);
    assert!(bids.sql().ends_with(" AND b.freelancer_id = $1"));

    let mut owner_bids = QueryBuilder::<Postgres>::new("SELECT b.id FROM bids b WHERE TRUE");
    ProjectScope::Owner { client_id: 3 }.push_bid_filter(&mut owner_bids);
    assert_eq!(owner_bids.sql(), "SELECT b.id FROM bids b WHERE TRUE");
}

#[tokio::test]
async fn test_resolve_scope_per_role() {
    let repo = InMemoryRepository::new();
    let market = seed_marketplace(&repo);

    let scope = visibility::resolve_scope(&repo, &Requester::new(market.alice.id, Role::Client))
        .await
        .unwrap();
    assert_eq!(
        scope,
        ProjectScope::Owner {
            client_id: market.alice_client.id
        }
    );

    let scope = visibility::resolve_scope(&repo, &Requester::new(market.grace.id, Role::Freelancer))
        .await
        .unwrap();
    assert_eq!(
        scope,
        ProjectScope::Bidder {
            freelancer_id: market.grace_freelancer.id
        }
    );

    // Admins need no profile.
    let scope = visibility::resolve_scope(&repo, &Requester::new(9999, Role::Admin))
        .await
        .unwrap();
    assert_eq!(scope, ProjectScope::All);
}

#[tokio::test]
async fn test_select_visible_projects_is_read_only() {
    let repo = InMemoryRepository::new();
    let market = seed_marketplace(&repo);
    repo.add_project(
        market.bob_client.id,
        draft("Late addition", ProjectCategory::Other, true),
        base_time() - chrono::Duration::days(1),
    );

    let requester = Requester::new(market.grace.id, Role::Freelancer);
    let first = visibility::select_visible_projects(&repo, &requester).await.unwrap();
    let second = visibility::select_visible_projects(&repo, &requester).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(repo.project_count(), 5);
    // The backdated project is the oldest, so it comes last.
    assert_eq!(first.last().map(|listing| listing.project.title.as_str()), Some("Late addition"));
}
