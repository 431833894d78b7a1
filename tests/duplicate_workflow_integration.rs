//! Integration tests for the duplicate scan and resolution workflow.
//!
//! These tests drive the duplicate-review HTTP endpoints with in-memory
//! adapters: scanning a tenant's contacts, listing the recorded candidates,
//! and resolving them through merge and ignore.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use donorbase::adapters::http::duplicates::{duplicates_router, DuplicatesAppState};
use donorbase::adapters::memory::{InMemoryContactRepository, InMemoryDuplicateMatchRepository};
use donorbase::domain::foundation::{ContactId, TenantId};
use donorbase::ports::ContactRepository;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    contacts: Arc<InMemoryContactRepository>,
    duplicates: Arc<InMemoryDuplicateMatchRepository>,
    tenant_id: TenantId,
}

async fn test_app() -> TestApp {
    let contacts = Arc::new(InMemoryContactRepository::new());
    let duplicates = Arc::new(InMemoryDuplicateMatchRepository::with_contacts(
        contacts.clone(),
    ));

    let state = DuplicatesAppState {
        contact_repository: contacts.clone(),
        duplicate_repository: duplicates.clone(),
    };

    TestApp {
        router: duplicates_router().with_state(state),
        contacts,
        duplicates,
        tenant_id: TenantId::new(),
    }
}

/// Seeds two contacts that look like the same person plus one bystander.
async fn seed_duplicate_pair(app: &TestApp) -> (ContactId, ContactId) {
    // Same name, same email local-part on different domains: scores above
    // the scan threshold without tripping the inline-match bar.
    let a = app
        .contacts
        .seed_contact("jane@x.com", Some("Jane"), Some("Doe"));
    let b = app
        .contacts
        .seed_contact("jane@relay.org", Some("Jane"), Some("Doe"));
    let bystander = app
        .contacts
        .seed_contact("bob@elsewhere.org", Some("Robert"), Some("Smith"));

    for id in [a, b, bystander] {
        app.contacts.link_tenant(app.tenant_id, id).await.unwrap();
    }
    (a, b)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn run_scan(app: &TestApp) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/scan",
            json!({"account": app.tenant_id.to_string()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

async fn list_duplicates(app: &TestApp) -> Value {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(format!("/?account={}", app.tenant_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

// =============================================================================
// Scanning
// =============================================================================

#[tokio::test]
async fn scan_records_likely_duplicates_only() {
    let app = test_app().await;
    seed_duplicate_pair(&app).await;

    let summary = run_scan(&app).await;
    assert_eq!(summary["contacts_scanned"], 3);
    assert_eq!(summary["pairs_compared"], 3);
    assert_eq!(summary["candidates_recorded"], 1);

    let listing = list_duplicates(&app).await;
    let duplicates = listing["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0]["confidence_score"].as_u64().unwrap() >= 50);
    assert_eq!(duplicates[0]["resolved"], false);
}

#[tokio::test]
async fn rescan_does_not_add_rows_for_recorded_pairs() {
    let app = test_app().await;
    seed_duplicate_pair(&app).await;

    run_scan(&app).await;
    let second = run_scan(&app).await;

    assert_eq!(second["candidates_found"], 1);
    assert_eq!(second["candidates_recorded"], 0);
    assert_eq!(app.duplicates.unresolved_count(), 1);
}

// =============================================================================
// Merge Resolution
// =============================================================================

#[tokio::test]
async fn merge_resolves_match_and_consolidates_the_pair() {
    let app = test_app().await;
    let (primary, secondary) = seed_duplicate_pair(&app).await;
    run_scan(&app).await;

    let listing = list_duplicates(&app).await;
    let duplicate_id = listing["duplicates"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/{}/merge", duplicate_id),
            json!({
                "primary_contact_id": primary.to_string(),
                "reviewed_by": "reviewer@org.test"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["duplicate"]["resolved"], true);
    assert!(body.get("merge_history_id").is_some());

    // Exactly one audit row with the chosen primary
    let histories = app.duplicates.histories();
    assert_eq!(histories.len(), 1);
    assert_eq!(histories[0].primary_contact_id, primary);
    assert_eq!(histories[0].merged_contact_id, secondary);

    // The secondary was consolidated into the primary
    assert_eq!(app.contacts.merged_into(secondary), Some(primary));
    assert_eq!(app.contacts.emails_for(primary).len(), 2);
    assert!(app.contacts.emails_for(secondary).is_empty());

    // And no longer appears in listings or future scans
    let listing = list_duplicates(&app).await;
    assert!(listing["duplicates"].as_array().unwrap().is_empty());
    let rescan = run_scan(&app).await;
    assert_eq!(rescan["contacts_scanned"], 2);
    assert_eq!(rescan["candidates_found"], 0);
}

#[tokio::test]
async fn merge_with_unrelated_primary_is_a_client_error() {
    let app = test_app().await;
    seed_duplicate_pair(&app).await;
    run_scan(&app).await;

    let listing = list_duplicates(&app).await;
    let duplicate_id = listing["duplicates"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/{}/merge", duplicate_id),
            json!({
                "primary_contact_id": ContactId::new().to_string(),
                "reviewed_by": "reviewer@org.test"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.duplicates.histories().len(), 0);
    assert_eq!(app.duplicates.unresolved_count(), 1);
}

// =============================================================================
// Ignore Resolution
// =============================================================================

#[tokio::test]
async fn ignore_resolves_without_history_or_consolidation() {
    let app = test_app().await;
    let (primary, secondary) = seed_duplicate_pair(&app).await;
    run_scan(&app).await;

    let listing = list_duplicates(&app).await;
    let duplicate_id = listing["duplicates"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/{}/ignore", duplicate_id),
            json!({"reviewed_by": "reviewer@org.test"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["duplicate"]["resolved"], true);
    assert!(body.get("merge_history_id").is_none());

    assert!(app.duplicates.histories().is_empty());
    assert_eq!(app.contacts.merged_into(secondary), None);
    assert_eq!(app.contacts.emails_for(primary).len(), 1);
}

#[tokio::test]
async fn resolving_twice_is_rejected() {
    let app = test_app().await;
    seed_duplicate_pair(&app).await;
    run_scan(&app).await;

    let listing = list_duplicates(&app).await;
    let duplicate_id = listing["duplicates"][0]["id"].as_str().unwrap().to_string();
    let ignore = json!({"reviewed_by": "reviewer@org.test"});

    let first = app
        .router
        .clone()
        .oneshot(post_json(&format!("/{}/ignore", duplicate_id), ignore.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .router
        .clone()
        .oneshot(post_json(&format!("/{}/ignore", duplicate_id), ignore))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn unknown_duplicate_id_is_not_found() {
    let app = test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/{}/ignore", uuid::Uuid::new_v4()),
            json!({"reviewed_by": "reviewer@org.test"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert!(body.get("request_id").is_some());
}
