//! Donation repository port.

use async_trait::async_trait;

use crate::domain::donation::{CustomField, Donation, MerchandiseItem};
use crate::domain::foundation::{DomainError, DonationId};

/// Repository port for donation persistence.
///
/// `insert` is the fatal step of the recording pipeline; the secondary
/// writes are invoked best-effort by the caller and their failures are
/// absorbed there.
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Persists the donation row. Transactional on its own.
    async fn insert(&self, donation: &Donation) -> Result<(), DomainError>;

    /// Persists the free-form custom fields attached to a donation.
    async fn add_custom_fields(
        &self,
        donation_id: DonationId,
        fields: &[CustomField],
    ) -> Result<(), DomainError>;

    /// Persists the merchandise line items attached to a donation.
    async fn add_merchandise(
        &self,
        donation_id: DonationId,
        items: &[MerchandiseItem],
    ) -> Result<(), DomainError>;
}
