//! Duplicate-match repository port.
//!
//! Matches are never deleted; the scanner inserts unresolved candidates and
//! the resolution workflow marks them resolved. Implementations enforce the
//! at-most-one-unresolved-row-per-unordered-pair invariant and run the merge
//! consolidation in a single transaction.

use async_trait::async_trait;

use crate::domain::dedupe::{DuplicateMatch, MergeHistory};
use crate::domain::foundation::{ContactId, DomainError, DuplicateMatchId, TenantId};

/// Repository port for candidate duplicate pairs and their audit trail.
#[async_trait]
pub trait DuplicateMatchRepository: Send + Sync {
    /// Inserts a new unresolved match unless one already exists for the
    /// unordered pair (both orderings considered). Returns `false` when the
    /// pair was already recorded and nothing was written.
    async fn insert_if_absent(&self, candidate: &DuplicateMatch) -> Result<bool, DomainError>;

    /// Fetches a match by id.
    async fn find_by_id(
        &self,
        id: DuplicateMatchId,
    ) -> Result<Option<DuplicateMatch>, DomainError>;

    /// Lists unresolved matches among the tenant's contacts, highest
    /// confidence first.
    async fn list_unresolved(&self, tenant_id: TenantId)
        -> Result<Vec<DuplicateMatch>, DomainError>;

    /// Persists an ignore resolution: the match row's resolved fields only.
    async fn record_ignore(&self, resolved: &DuplicateMatch) -> Result<(), DomainError>;

    /// Persists a merge resolution in one transaction: the match row's
    /// resolved fields, the merge-history row, reassignment of the
    /// secondary contact's emails/phones/locations/employers/donations/
    /// tenant links to the primary, primary-flag demotion where the primary
    /// already holds a primary channel, and the secondary's `merged_into`
    /// marker.
    async fn record_merge(
        &self,
        resolved: &DuplicateMatch,
        primary_id: ContactId,
        secondary_id: ContactId,
        history: &MergeHistory,
    ) -> Result<(), DomainError>;
}
