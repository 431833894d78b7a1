//! PostgreSQL adapters - sqlx implementations of the repository ports.

mod contact_repository;
mod credential_store;
mod donation_repository;
mod duplicate_match_repository;

pub use contact_repository::PostgresContactRepository;
pub use credential_store::PostgresCredentialStore;
pub use donation_repository::PostgresDonationRepository;
pub use duplicate_match_repository::PostgresDuplicateMatchRepository;
