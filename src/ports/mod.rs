//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ContactRepository` - contact aggregate persistence, including the
//!   atomic find-or-create that closes the ingestion race
//! - `DonationRepository` - donation persistence plus best-effort children
//! - `DuplicateMatchRepository` - candidate pairs, resolution, merge audit
//! - `CredentialStore` - tenant webhook credential lookups
//! - `NotificationDispatcher` - fire-and-forget donation notifications

mod contact_repository;
mod credential_store;
mod donation_repository;
mod duplicate_match_repository;
mod notification_dispatcher;

pub use contact_repository::{ContactRepository, ResolvedContact};
pub use credential_store::{CredentialStore, WebhookCredential};
pub use donation_repository::DonationRepository;
pub use duplicate_match_repository::DuplicateMatchRepository;
pub use notification_dispatcher::{DonationNotification, NotificationDispatcher};
