//! Webhook HTTP module: credential validation, routes, handlers, DTOs.

mod auth;
mod dto;
mod handlers;
mod routes;

pub use auth::{BasicCredentials, CredentialValidator, TENANT_HINT_HEADER};
pub use dto::{DonationView, DonorView, WebhookSuccessResponse};
pub use handlers::{handle_donation_webhook, WebhookAppState};
pub use routes::webhook_router;
