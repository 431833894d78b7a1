//! Candidate duplicate pairs and their resolution audit trail.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ContactId, DomainError, DuplicateMatchId, Timestamp};

use super::scoring::ScoreBreakdown;

/// A candidate pair of contacts suspected to represent the same person.
///
/// The pair is unordered: `(a, b)` and `(b, a)` name the same match, and
/// while unresolved at most one row exists for the pair. Matches are never
/// deleted, only marked resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub id: DuplicateMatchId,
    pub contact1_id: ContactId,
    pub contact2_id: ContactId,
    pub scores: ScoreBreakdown,
    pub resolved: bool,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl DuplicateMatch {
    /// Creates a new unresolved match for a scored pair.
    pub fn new(contact1_id: ContactId, contact2_id: ContactId, scores: ScoreBreakdown) -> Self {
        Self {
            id: DuplicateMatchId::new(),
            contact1_id,
            contact2_id,
            scores,
            resolved: false,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Timestamp::now(),
        }
    }

    /// Canonical ordering of the pair, used for unordered dedup checks.
    pub fn pair_key(&self) -> (ContactId, ContactId) {
        ordered_pair(self.contact1_id, self.contact2_id)
    }

    /// True when the given contact is one of the pair.
    pub fn involves(&self, contact_id: ContactId) -> bool {
        self.contact1_id == contact_id || self.contact2_id == contact_id
    }

    /// Returns the other side of the pair relative to `contact_id`.
    pub fn other_side(&self, contact_id: ContactId) -> Option<ContactId> {
        if self.contact1_id == contact_id {
            Some(self.contact2_id)
        } else if self.contact2_id == contact_id {
            Some(self.contact1_id)
        } else {
            None
        }
    }

    /// Transitions `unresolved -> resolved`, recording the reviewer.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the match is already resolved.
    pub fn resolve(&mut self, reviewed_by: impl Into<String>) -> Result<(), DomainError> {
        if self.resolved {
            return Err(DomainError::validation(
                "duplicate_id",
                "duplicate match is already resolved",
            ));
        }
        self.resolved = true;
        self.reviewed_by = Some(reviewed_by.into());
        self.reviewed_at = Some(Timestamp::now());
        Ok(())
    }
}

/// Normalizes an unordered contact pair into (low, high) order.
pub fn ordered_pair(a: ContactId, b: ContactId) -> (ContactId, ContactId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Immutable audit record written when a merge resolution consolidates one
/// contact into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeHistory {
    pub id: Uuid,
    pub primary_contact_id: ContactId,
    pub merged_contact_id: ContactId,
    pub merged_by: String,
    pub merged_at: Timestamp,
}

impl MergeHistory {
    pub fn new(
        primary_contact_id: ContactId,
        merged_contact_id: ContactId,
        merged_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            primary_contact_id,
            merged_contact_id,
            merged_by: merged_by.into(),
            merged_at: Timestamp::now(),
        }
    }
}
