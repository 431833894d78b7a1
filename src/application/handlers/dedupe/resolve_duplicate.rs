//! ResolveDuplicateHandler - Command handler for the review workflow.
//!
//! A human reviewer resolves a candidate match one of two ways:
//!
//! - `ignore` marks it resolved with no other side effects
//! - `merge` marks it resolved, writes one merge-history audit row, and
//!   consolidates the secondary contact into the chosen primary (channel
//!   rows, donations, and tenant links move; the secondary is soft-
//!   deactivated via its `merged_into` marker)

use std::sync::Arc;

use tracing::info;

use crate::domain::dedupe::{DuplicateMatch, MergeHistory};
use crate::domain::foundation::{ContactId, DomainError, DuplicateMatchId};
use crate::ports::DuplicateMatchRepository;

/// The reviewer's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionAction {
    Ignore,
    Merge { primary_contact_id: ContactId },
}

/// Command to resolve one duplicate match.
#[derive(Debug, Clone)]
pub struct ResolveDuplicateCommand {
    pub duplicate_id: DuplicateMatchId,
    pub action: ResolutionAction,
    pub reviewed_by: String,
}

/// Result of a resolution.
#[derive(Debug, Clone)]
pub struct ResolveDuplicateResult {
    pub resolved: DuplicateMatch,
    /// Present only for merge resolutions.
    pub merge_history: Option<MergeHistory>,
}

/// Handler for the resolution workflow.
pub struct ResolveDuplicateHandler {
    matches: Arc<dyn DuplicateMatchRepository>,
}

impl ResolveDuplicateHandler {
    pub fn new(matches: Arc<dyn DuplicateMatchRepository>) -> Self {
        Self { matches }
    }

    pub async fn handle(
        &self,
        cmd: ResolveDuplicateCommand,
    ) -> Result<ResolveDuplicateResult, DomainError> {
        let mut duplicate = self
            .matches
            .find_by_id(cmd.duplicate_id)
            .await?
            .ok_or_else(|| DomainError::not_found("duplicate match"))?;

        match cmd.action {
            ResolutionAction::Ignore => {
                duplicate.resolve(&cmd.reviewed_by)?;
                self.matches.record_ignore(&duplicate).await?;
                info!(duplicate_id = %duplicate.id, reviewer = %cmd.reviewed_by, "duplicate ignored");
                Ok(ResolveDuplicateResult {
                    resolved: duplicate,
                    merge_history: None,
                })
            }
            ResolutionAction::Merge { primary_contact_id } => {
                let secondary_id = duplicate.other_side(primary_contact_id).ok_or_else(|| {
                    DomainError::validation(
                        "primary_contact_id",
                        "primary contact must be one of the matched pair",
                    )
                })?;

                duplicate.resolve(&cmd.reviewed_by)?;
                let history =
                    MergeHistory::new(primary_contact_id, secondary_id, &cmd.reviewed_by);
                self.matches
                    .record_merge(&duplicate, primary_contact_id, secondary_id, &history)
                    .await?;

                info!(
                    duplicate_id = %duplicate.id,
                    primary = %primary_contact_id,
                    merged = %secondary_id,
                    reviewer = %cmd.reviewed_by,
                    "duplicate merged"
                );
                Ok(ResolveDuplicateResult {
                    resolved: duplicate,
                    merge_history: Some(history),
                })
            }
        }
    }
}
