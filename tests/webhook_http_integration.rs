//! Integration tests for the donation webhook endpoint.
//!
//! These tests drive the full HTTP pipeline (auth, parsing, normalization,
//! identity resolution, donation recording) through the Axum router with
//! in-memory adapters.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use donorbase::adapters::http::webhook::{webhook_router, WebhookAppState};
use donorbase::adapters::memory::{
    InMemoryContactRepository, InMemoryCredentialStore, InMemoryDonationRepository,
};
use donorbase::adapters::notify::InMemoryNotificationDispatcher;
use donorbase::domain::foundation::TenantId;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    contacts: Arc<InMemoryContactRepository>,
    donations: Arc<InMemoryDonationRepository>,
    tenant_id: TenantId,
}

const API_USERNAME: &str = "hook-user";
const API_PASSWORD: &str = "s3cret-hook-pass";

fn test_app() -> TestApp {
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let tenant_id = credentials.add(API_USERNAME, API_PASSWORD, true);

    let contacts = Arc::new(InMemoryContactRepository::new());
    let donations = Arc::new(InMemoryDonationRepository::new());

    let state = WebhookAppState {
        credential_store: credentials,
        contact_repository: contacts.clone(),
        donation_repository: donations.clone(),
        notification_dispatcher: Arc::new(InMemoryNotificationDispatcher::new()),
        allow_unauthenticated: false,
    };

    TestApp {
        router: webhook_router().with_state(state),
        contacts,
        donations,
        tenant_id,
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{}:{}", username, password)))
}

fn donation_request(body: Value, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/donation")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic_auth(API_USERNAME, password))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn jane_payload() -> Value {
    json!({
        "donor": {"email": "jane@x.com", "firstname": "Jane"},
        "contribution": {
            "amount": "25.00",
            "createdAt": "2024-01-01T00:00:00Z",
            "isRecurring": false
        }
    })
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn valid_payload_returns_success_and_records_one_donation() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(donation_request(jane_payload(), API_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["donation"]["amount"], "25.00");
    assert_eq!(body["donation"]["recurring_period"], "once");
    assert_eq!(body["donor"]["first_name"], "Jane");
    assert!(body.get("request_id").is_some());
    assert!(body.get("timestamp").is_some());

    assert_eq!(app.donations.donation_count(), 1);
    assert_eq!(app.contacts.contact_count(), 1);
}

#[tokio::test]
async fn tenant_is_linked_to_the_resolved_contact() {
    let app = test_app();

    app.router
        .clone()
        .oneshot(donation_request(jane_payload(), API_PASSWORD))
        .await
        .unwrap();

    let links = app.contacts.tenant_links();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].0, app.tenant_id);
}

#[tokio::test]
async fn same_email_twice_yields_one_contact_and_two_donations() {
    let app = test_app();

    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(donation_request(jane_payload(), API_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(app.contacts.contact_count(), 1);
    assert_eq!(app.donations.donation_count(), 2);
    let donations = app.donations.donations();
    assert_eq!(donations[0].contact_id, donations[1].contact_id);
}

#[tokio::test]
async fn anonymous_donation_has_null_donor() {
    let app = test_app();
    let payload = json!({
        "contribution": {"amount": "10", "createdAt": "2024-01-01T00:00:00Z"}
    });

    let response = app
        .router
        .clone()
        .oneshot(donation_request(payload, API_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["donor"].is_null());
    assert_eq!(app.contacts.contact_count(), 0);
    assert_eq!(app.donations.donation_count(), 1);
}

#[tokio::test]
async fn infinite_recurring_duration_is_normalized_to_sentinel() {
    let app = test_app();
    let payload = json!({
        "donor": {"email": "jane@x.com", "firstname": "Jane"},
        "contribution": {
            "amount": "25.00",
            "createdAt": "2024-01-01T00:00:00Z",
            "isRecurring": "true",
            "recurringPeriod": "monthly",
            "recurringDuration": "infinite"
        }
    });

    let response = app
        .router
        .clone()
        .oneshot(donation_request(payload, API_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["donation"]["recurring_period"], "monthly");
    assert_eq!(body["donation"]["recurring_duration"], 9999);
}

// =============================================================================
// Authentication Failures
// =============================================================================

#[tokio::test]
async fn wrong_password_is_unauthorized_and_writes_nothing() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(donation_request(jane_payload(), "wrong-password"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["code"], 401);
    assert!(body.get("request_id").is_some());

    assert_eq!(app.donations.donation_count(), 0);
    assert_eq!(app.contacts.contact_count(), 0);
}

#[tokio::test]
async fn missing_authorization_header_is_unauthorized() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/donation")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(jane_payload().to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_username_is_not_found() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/donation")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic_auth("nobody", API_PASSWORD))
        .body(Body::from(jane_payload().to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "not_found");
}

// =============================================================================
// Payload Failures
// =============================================================================

#[tokio::test]
async fn malformed_json_is_invalid_payload() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/donation")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic_auth(API_USERNAME, API_PASSWORD))
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_payload");
}

#[tokio::test]
async fn missing_amount_is_invalid_payload_structure() {
    let app = test_app();
    let payload = json!({
        "donor": {"email": "jane@x.com"},
        "contribution": {"createdAt": "2024-01-01T00:00:00Z"}
    });

    let response = app
        .router
        .clone()
        .oneshot(donation_request(payload, API_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_payload_structure");
    assert_eq!(body["code"], 422);
    assert_eq!(app.donations.donation_count(), 0);
}

#[tokio::test]
async fn amount_falls_back_to_lineitems() {
    let app = test_app();
    let payload = json!({
        "contribution": {"createdAt": "2024-01-01T00:00:00Z"},
        "lineitems": [{"amount": "12.34", "paidAt": "2024-01-02T00:00:00Z"}]
    });

    let response = app
        .router
        .clone()
        .oneshot(donation_request(payload, API_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["donation"]["amount"], "12.34");
}

// =============================================================================
// Method Handling
// =============================================================================

#[tokio::test]
async fn non_post_method_gets_taxonomy_error_body() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/donation")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body = response_json(response).await;
    assert_eq!(body["error"], "method_not_allowed");
    assert_eq!(body["code"], 405);
}

#[tokio::test]
async fn options_preflight_is_answered_by_cors_layer() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/donation")
        .header(header::ORIGIN, "https://dashboard.example.org")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
}
