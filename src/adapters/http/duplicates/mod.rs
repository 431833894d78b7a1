//! Duplicate-review HTTP module: routes, handlers, DTOs.

mod dto;
mod handlers;
mod routes;

pub use dto::{DuplicateMatchView, ListDuplicatesResponse, ResolutionResponse, ScanResponse};
pub use handlers::DuplicatesAppState;
pub use routes::duplicates_router;
