//! HTTP adapters - REST API implementations.
//!
//! Each subsystem has its own HTTP module; `error` holds the shared mapping
//! from error kinds to response bodies.

pub mod duplicates;
pub mod error;
pub mod webhook;

// Re-export key types for convenience
pub use duplicates::{duplicates_router, DuplicatesAppState};
pub use error::{ApiError, ErrorBody};
pub use webhook::{webhook_router, WebhookAppState};
