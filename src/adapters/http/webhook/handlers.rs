//! HTTP handlers for the donation webhook endpoint.
//!
//! These handlers connect the Axum route to the application layer: credential
//! validation, two-stage body parsing (malformed JSON vs. wrong structure),
//! ingestion, and the success/error response shapes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::application::handlers::ingestion::{IngestDonationCommand, IngestDonationHandler};
use crate::domain::donation::WebhookPayload;
use crate::domain::foundation::{DomainError, ErrorKind, RequestId, TenantId};
use crate::ports::{ContactRepository, CredentialStore, DonationRepository, NotificationDispatcher};

use super::super::error::ApiError;
use super::auth::{CredentialValidator, TENANT_HINT_HEADER};
use super::dto::{DonationView, DonorView, WebhookSuccessResponse};

/// Shared state for the webhook routes.
///
/// Cloned per request; all dependencies are Arc-wrapped ports.
#[derive(Clone)]
pub struct WebhookAppState {
    pub credential_store: Arc<dyn CredentialStore>,
    pub contact_repository: Arc<dyn ContactRepository>,
    pub donation_repository: Arc<dyn DonationRepository>,
    pub notification_dispatcher: Arc<dyn NotificationDispatcher>,
    /// Development-only auth bypass; config validation rejects it in
    /// production.
    pub allow_unauthenticated: bool,
}

impl WebhookAppState {
    fn credential_validator(&self) -> CredentialValidator {
        CredentialValidator::new(self.credential_store.clone(), self.allow_unauthenticated)
    }

    fn ingest_handler(&self) -> IngestDonationHandler {
        IngestDonationHandler::new(
            self.contact_repository.clone(),
            self.donation_repository.clone(),
            self.notification_dispatcher.clone(),
        )
    }
}

/// POST /api/webhooks/donation - Ingest a third-party donation event.
pub async fn handle_donation_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = RequestId::new();
    let fail = |error: DomainError| ApiError::new(error, request_id);

    // 1. Authenticate the caller
    let authorization = headers.get("authorization").and_then(|v| v.to_str().ok());
    let tenant_hint = parse_tenant_hint(&headers);
    let tenant_id = state
        .credential_validator()
        .validate(authorization, tenant_hint)
        .await
        .map_err(fail)?;

    // 2. Parse the body in two stages so malformed JSON and wrong structure
    //    report as distinct error kinds
    let value: serde_json::Value = serde_json::from_slice(&body).map_err(|err| {
        fail(DomainError::new(
            ErrorKind::InvalidPayload,
            format!("request body is not valid JSON: {}", err),
        ))
    })?;
    let payload: WebhookPayload = serde_json::from_value(value).map_err(|err| {
        fail(DomainError::new(
            ErrorKind::InvalidPayloadStructure,
            format!("payload does not match the webhook schema: {}", err),
        ))
    })?;

    // 3. Run the ingestion pipeline
    let result = state
        .ingest_handler()
        .handle(IngestDonationCommand { tenant_id, payload })
        .await
        .map_err(fail)?;

    info!(
        request_id = %request_id,
        donation_id = %result.donation.id,
        anonymous = result.contact.is_none(),
        "donation ingested"
    );

    let response = WebhookSuccessResponse::new(
        DonationView::from(&result.donation),
        result.contact.as_ref().map(DonorView::from),
        request_id,
    );
    Ok(Json(response))
}

/// Fallback for non-POST methods on the webhook route. OPTIONS never reaches
/// this handler; the CORS layer answers preflight first.
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(
        DomainError::new(
            ErrorKind::MethodNotAllowed,
            "the webhook endpoint only accepts POST",
        ),
        RequestId::new(),
    )
}

fn parse_tenant_hint(headers: &HeaderMap) -> Option<TenantId> {
    let raw = headers.get(TENANT_HINT_HEADER)?.to_str().ok()?;
    match raw.parse::<TenantId>() {
        Ok(tenant_id) => Some(tenant_id),
        Err(_) => {
            tracing::warn!(value = raw, "ignoring unparsable tenant hint header");
            None
        }
    }
}
