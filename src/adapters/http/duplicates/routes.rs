//! Axum router configuration for the duplicate-review endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    ignore_duplicate, list_duplicates, merge_duplicate, scan_duplicates, DuplicatesAppState,
};

/// Create the duplicate-review router.
///
/// # Routes
///
/// - `GET  /` - list unresolved matches for a tenant
/// - `POST /scan` - run the batch scanner for a tenant
/// - `POST /{id}/merge` - merge resolution
/// - `POST /{id}/ignore` - ignore resolution
pub fn duplicates_router() -> Router<DuplicatesAppState> {
    Router::new()
        .route("/", get(list_duplicates))
        .route("/scan", post(scan_duplicates))
        .route("/:id/merge", post(merge_duplicate))
        .route("/:id/ignore", post(ignore_duplicate))
}
