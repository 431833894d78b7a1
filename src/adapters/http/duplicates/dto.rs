//! HTTP DTOs for the duplicate-review endpoints.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::handlers::dedupe::ScanDuplicatesResult;
use crate::domain::dedupe::DuplicateMatch;
use crate::domain::foundation::{RequestId, Timestamp};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query parameters for listing duplicates.
#[derive(Debug, Clone, Deserialize)]
pub struct ListDuplicatesQuery {
    /// Tenant account whose contacts are being reviewed.
    pub account: Uuid,
}

/// Request to run the duplicate scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub account: Uuid,
}

/// Request to merge a duplicate pair into a chosen primary.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub primary_contact_id: Uuid,
    pub reviewed_by: String,
}

/// Request to ignore a duplicate pair.
#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreRequest {
    pub reviewed_by: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One candidate match in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateMatchView {
    pub id: String,
    pub contact1_id: String,
    pub contact2_id: String,
    pub confidence_score: u8,
    pub name_score: u8,
    pub email_score: u8,
    pub phone_score: u8,
    pub address_score: u8,
    pub resolved: bool,
    pub created_at: String,
}

impl From<&DuplicateMatch> for DuplicateMatchView {
    fn from(m: &DuplicateMatch) -> Self {
        Self {
            id: m.id.to_string(),
            contact1_id: m.contact1_id.to_string(),
            contact2_id: m.contact2_id.to_string(),
            confidence_score: m.scores.confidence,
            name_score: m.scores.name,
            email_score: m.scores.email,
            phone_score: m.scores.phone,
            address_score: m.scores.address,
            resolved: m.resolved,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Listing response.
#[derive(Debug, Clone, Serialize)]
pub struct ListDuplicatesResponse {
    pub duplicates: Vec<DuplicateMatchView>,
    pub request_id: RequestId,
    pub timestamp: Timestamp,
}

/// Scanner summary response.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub contacts_scanned: usize,
    pub pairs_compared: usize,
    pub candidates_found: usize,
    pub candidates_recorded: usize,
    pub request_id: RequestId,
    pub timestamp: Timestamp,
}

impl ScanResponse {
    pub fn new(result: ScanDuplicatesResult, request_id: RequestId) -> Self {
        Self {
            contacts_scanned: result.contacts_scanned,
            pairs_compared: result.pairs_compared,
            candidates_found: result.candidates_found,
            candidates_recorded: result.candidates_recorded,
            request_id,
            timestamp: Timestamp::now(),
        }
    }
}

/// Resolution response for merge and ignore.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResponse {
    pub duplicate: DuplicateMatchView,
    /// Id of the merge-history row, present only for merges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_history_id: Option<String>,
    pub request_id: RequestId,
    pub timestamp: Timestamp,
}
