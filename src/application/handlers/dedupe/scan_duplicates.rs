//! ScanDuplicatesHandler - Command handler for the batch duplicate scan.
//!
//! Pairwise-compares all of a tenant's contacts and persists unresolved
//! candidate matches. O(n^2) in the tenant's contact count; runs out-of-band
//! from ingestion and takes no locks, so results are advisory. A failure on
//! one pair is logged and the scan continues.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::dedupe::{score_pair, DuplicateMatch, SCAN_THRESHOLD};
use crate::domain::foundation::{DomainError, TenantId};
use crate::ports::{ContactRepository, DuplicateMatchRepository};

/// Command to scan one tenant's contacts for duplicates.
#[derive(Debug, Clone)]
pub struct ScanDuplicatesCommand {
    pub tenant_id: TenantId,
}

/// Summary of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDuplicatesResult {
    pub contacts_scanned: usize,
    pub pairs_compared: usize,
    /// Pairs that cleared the confidence threshold.
    pub candidates_found: usize,
    /// Pairs actually written (not already recorded, insert succeeded).
    pub candidates_recorded: usize,
}

/// Handler for the duplicate scan.
pub struct ScanDuplicatesHandler {
    contacts: Arc<dyn ContactRepository>,
    matches: Arc<dyn DuplicateMatchRepository>,
}

impl ScanDuplicatesHandler {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        matches: Arc<dyn DuplicateMatchRepository>,
    ) -> Self {
        Self { contacts, matches }
    }

    pub async fn handle(
        &self,
        cmd: ScanDuplicatesCommand,
    ) -> Result<ScanDuplicatesResult, DomainError> {
        let snapshots = self
            .contacts
            .list_snapshots_for_tenant(cmd.tenant_id)
            .await?;

        let mut result = ScanDuplicatesResult {
            contacts_scanned: snapshots.len(),
            pairs_compared: 0,
            candidates_found: 0,
            candidates_recorded: 0,
        };

        for i in 0..snapshots.len() {
            for j in (i + 1)..snapshots.len() {
                result.pairs_compared += 1;
                let scores = score_pair(&snapshots[i], &snapshots[j]);
                if scores.confidence < SCAN_THRESHOLD {
                    continue;
                }
                result.candidates_found += 1;

                let candidate =
                    DuplicateMatch::new(snapshots[i].id, snapshots[j].id, scores);
                match self.matches.insert_if_absent(&candidate).await {
                    Ok(true) => result.candidates_recorded += 1,
                    Ok(false) => {
                        // Unresolved match already on record for this pair
                    }
                    Err(err) => {
                        warn!(
                            contact1 = %candidate.contact1_id,
                            contact2 = %candidate.contact2_id,
                            %err,
                            "failed to record duplicate candidate, continuing scan"
                        );
                    }
                }
            }
        }

        info!(
            tenant_id = %cmd.tenant_id,
            contacts = result.contacts_scanned,
            pairs = result.pairs_compared,
            recorded = result.candidates_recorded,
            "duplicate scan finished"
        );
        Ok(result)
    }
}
