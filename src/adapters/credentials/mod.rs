//! Credential store decorators.

mod cached;

pub use cached::CachedCredentialStore;
