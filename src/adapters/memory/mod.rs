//! In-memory adapters.
//!
//! Full implementations of the repository ports backed by process memory.
//! They mirror the PostgreSQL adapters' observable behavior (atomic
//! find-or-create, unordered-pair dedup, merge consolidation) and back the
//! integration tests; nothing here talks to the network.

mod contact_repository;
mod credential_store;
mod donation_repository;
mod duplicate_match_repository;

pub use contact_repository::InMemoryContactRepository;
pub use credential_store::InMemoryCredentialStore;
pub use donation_repository::InMemoryDonationRepository;
pub use duplicate_match_repository::InMemoryDuplicateMatchRepository;
