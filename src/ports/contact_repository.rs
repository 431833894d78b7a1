//! Contact repository port.
//!
//! The find-or-create operation is the pipeline's only concurrency-sensitive
//! write: implementations must make it atomic against the unique constraint
//! on the email address (insert, on-conflict resolve to the existing owner)
//! rather than a separate select followed by insert. A read-then-write
//! sequence here loses the race described in the concurrency model and
//! produces duplicate contacts.

use async_trait::async_trait;

use crate::domain::contact::{Contact, EmployerRecord, Location, PhoneNumber};
use crate::domain::dedupe::ContactSnapshot;
use crate::domain::donation::DonorData;
use crate::domain::foundation::{ContactId, DomainError, TenantId};

/// Outcome of resolving a donor to a contact.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContact {
    pub contact: Contact,
    /// True when a fresh contact row was created for this donor.
    pub created: bool,
}

/// Repository port for the Contact aggregate and its channel rows.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Looks up a contact by exact email address (case-sensitive, as stored).
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError>;

    /// Looks up a contact by id.
    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, DomainError>;

    /// Atomically finds or creates the contact owning `email`.
    ///
    /// One transaction: insert a provisional contact, insert the email with
    /// on-conflict resolution, and when the conflict reveals an existing
    /// owner, drop the provisional row and update the owner's mutable
    /// fields from `donor` instead.
    async fn find_or_create_by_email(
        &self,
        email: &str,
        donor: &DonorData,
    ) -> Result<ResolvedContact, DomainError>;

    /// Updates a contact's mutable fields from a donor payload.
    async fn update_from_donor(
        &self,
        contact_id: ContactId,
        donor: &DonorData,
    ) -> Result<Contact, DomainError>;

    /// Attaches an additional email address to an existing contact
    /// (inline-match path). A concurrent insert of the same address is not
    /// an error.
    async fn attach_email(&self, contact_id: ContactId, email: &str) -> Result<(), DomainError>;

    /// Attaches a phone number to a contact.
    async fn add_phone(&self, phone: &PhoneNumber) -> Result<(), DomainError>;

    /// Attaches a location to a contact.
    async fn add_location(&self, location: &Location) -> Result<(), DomainError>;

    /// Attaches an employer record to a contact.
    async fn add_employer(&self, record: &EmployerRecord) -> Result<(), DomainError>;

    /// Ensures the tenant-contact link exists; inserting an existing pair
    /// is a no-op.
    async fn link_tenant(
        &self,
        tenant_id: TenantId,
        contact_id: ContactId,
    ) -> Result<(), DomainError>;

    /// Promotes a contact to donor status.
    async fn promote_to_donor(&self, contact_id: ContactId) -> Result<(), DomainError>;

    /// Loads scoring snapshots for every contact owned by the tenant,
    /// excluding contacts already merged away.
    async fn list_snapshots_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ContactSnapshot>, DomainError>;
}
