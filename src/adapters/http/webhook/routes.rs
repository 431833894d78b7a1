//! Axum router configuration for the donation webhook.

use axum::http::{header, Method};
use axum::routing::post;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{handle_donation_webhook, method_not_allowed, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
///
/// - `POST /donation` - ingest a donation event (Basic auth, signature-free)
/// - `OPTIONS /donation` - CORS preflight, answered by the CORS layer
/// - any other method - `method_not_allowed` error body
pub fn webhook_router() -> Router<WebhookAppState> {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route(
            "/donation",
            post(handle_donation_webhook).fallback(method_not_allowed),
        )
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::InMemoryNotificationDispatcher;
    use crate::domain::foundation::{DomainError, TenantId};
    use crate::ports::{CredentialStore, WebhookCredential};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EmptyCredentialStore;

    #[async_trait]
    impl CredentialStore for EmptyCredentialStore {
        async fn find_credentials(
            &self,
            _tenant_hint: Option<TenantId>,
            _username: &str,
        ) -> Result<Vec<WebhookCredential>, DomainError> {
            Ok(vec![])
        }
    }

    #[test]
    fn webhook_router_builds() {
        let state = WebhookAppState {
            credential_store: Arc::new(EmptyCredentialStore),
            contact_repository: Arc::new(crate::adapters::memory::InMemoryContactRepository::new()),
            donation_repository: Arc::new(
                crate::adapters::memory::InMemoryDonationRepository::new(),
            ),
            notification_dispatcher: Arc::new(InMemoryNotificationDispatcher::new()),
            allow_unauthenticated: false,
        };
        let _: Router<()> = webhook_router().with_state(state);
    }
}
