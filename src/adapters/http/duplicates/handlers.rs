//! HTTP handlers for the duplicate-review endpoints consumed by the UI.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::application::handlers::dedupe::{
    ResolutionAction, ResolveDuplicateCommand, ResolveDuplicateHandler, ScanDuplicatesCommand,
    ScanDuplicatesHandler,
};
use crate::domain::foundation::{ContactId, DuplicateMatchId, RequestId, TenantId, Timestamp};
use crate::ports::{ContactRepository, DuplicateMatchRepository};

use super::super::error::ApiError;
use super::dto::{
    DuplicateMatchView, IgnoreRequest, ListDuplicatesQuery, ListDuplicatesResponse, MergeRequest,
    ResolutionResponse, ScanRequest, ScanResponse,
};

/// Shared state for the duplicate-review routes.
#[derive(Clone)]
pub struct DuplicatesAppState {
    pub contact_repository: Arc<dyn ContactRepository>,
    pub duplicate_repository: Arc<dyn DuplicateMatchRepository>,
}

impl DuplicatesAppState {
    fn scan_handler(&self) -> ScanDuplicatesHandler {
        ScanDuplicatesHandler::new(
            self.contact_repository.clone(),
            self.duplicate_repository.clone(),
        )
    }

    fn resolve_handler(&self) -> ResolveDuplicateHandler {
        ResolveDuplicateHandler::new(self.duplicate_repository.clone())
    }
}

/// GET /api/duplicates?account=<tenant-id> - List unresolved matches.
pub async fn list_duplicates(
    State(state): State<DuplicatesAppState>,
    Query(query): Query<ListDuplicatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = RequestId::new();
    let matches = state
        .duplicate_repository
        .list_unresolved(TenantId::from_uuid(query.account))
        .await
        .map_err(|error| ApiError::new(error, request_id))?;

    Ok(Json(ListDuplicatesResponse {
        duplicates: matches.iter().map(DuplicateMatchView::from).collect(),
        request_id,
        timestamp: Timestamp::now(),
    }))
}

/// POST /api/duplicates/scan - Run the scanner for one tenant.
pub async fn scan_duplicates(
    State(state): State<DuplicatesAppState>,
    Json(request): Json<ScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = RequestId::new();
    let result = state
        .scan_handler()
        .handle(ScanDuplicatesCommand {
            tenant_id: TenantId::from_uuid(request.account),
        })
        .await
        .map_err(|error| ApiError::new(error, request_id))?;

    Ok(Json(ScanResponse::new(result, request_id)))
}

/// POST /api/duplicates/{id}/merge - Merge the pair into the chosen primary.
pub async fn merge_duplicate(
    State(state): State<DuplicatesAppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MergeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = RequestId::new();
    let result = state
        .resolve_handler()
        .handle(ResolveDuplicateCommand {
            duplicate_id: DuplicateMatchId::from_uuid(id),
            action: ResolutionAction::Merge {
                primary_contact_id: ContactId::from_uuid(request.primary_contact_id),
            },
            reviewed_by: request.reviewed_by,
        })
        .await
        .map_err(|error| ApiError::new(error, request_id))?;

    Ok(Json(ResolutionResponse {
        duplicate: DuplicateMatchView::from(&result.resolved),
        merge_history_id: result.merge_history.map(|h| h.id.to_string()),
        request_id,
        timestamp: Timestamp::now(),
    }))
}

/// POST /api/duplicates/{id}/ignore - Dismiss the pair.
pub async fn ignore_duplicate(
    State(state): State<DuplicatesAppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IgnoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = RequestId::new();
    let result = state
        .resolve_handler()
        .handle(ResolveDuplicateCommand {
            duplicate_id: DuplicateMatchId::from_uuid(id),
            action: ResolutionAction::Ignore,
            reviewed_by: request.reviewed_by,
        })
        .await
        .map_err(|error| ApiError::new(error, request_id))?;

    Ok(Json(ResolutionResponse {
        duplicate: DuplicateMatchView::from(&result.resolved),
        merge_history_id: None,
        request_id,
        timestamp: Timestamp::now(),
    }))
}
