//! In-memory implementation of DonationRepository.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::donation::{CustomField, Donation, MerchandiseItem};
use crate::domain::foundation::{ContactId, DomainError, DonationId};
use crate::ports::DonationRepository;

/// In-memory implementation of the DonationRepository port.
#[derive(Default)]
pub struct InMemoryDonationRepository {
    donations: Mutex<Vec<Donation>>,
    custom_fields: Mutex<Vec<(DonationId, CustomField)>>,
    merchandise: Mutex<Vec<(DonationId, MerchandiseItem)>>,
}

impl InMemoryDonationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn donation_count(&self) -> usize {
        self.donations.lock().unwrap().len()
    }

    pub fn donations(&self) -> Vec<Donation> {
        self.donations.lock().unwrap().clone()
    }

    pub fn donations_for(&self, contact_id: ContactId) -> Vec<Donation> {
        self.donations
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.contact_id == Some(contact_id))
            .cloned()
            .collect()
    }

    pub fn custom_field_count(&self) -> usize {
        self.custom_fields.lock().unwrap().len()
    }

    pub fn merchandise_count(&self) -> usize {
        self.merchandise.lock().unwrap().len()
    }
}

#[async_trait]
impl DonationRepository for InMemoryDonationRepository {
    async fn insert(&self, donation: &Donation) -> Result<(), DomainError> {
        self.donations.lock().unwrap().push(donation.clone());
        Ok(())
    }

    async fn add_custom_fields(
        &self,
        donation_id: DonationId,
        fields: &[CustomField],
    ) -> Result<(), DomainError> {
        let mut store = self.custom_fields.lock().unwrap();
        for field in fields {
            store.push((donation_id, field.clone()));
        }
        Ok(())
    }

    async fn add_merchandise(
        &self,
        donation_id: DonationId,
        items: &[MerchandiseItem],
    ) -> Result<(), DomainError> {
        let mut store = self.merchandise.lock().unwrap();
        for item in items {
            store.push((donation_id, item.clone()));
        }
        Ok(())
    }
}
