//! In-memory implementation of ContactRepository.
//!
//! A single mutex guards the whole store, which makes every multi-row
//! operation atomic the way the PostgreSQL transaction does.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::contact::{
    Contact, EmailAddress, EmployerRecord, Location, PhoneNumber,
};
use crate::domain::dedupe::{ContactSnapshot, SnapshotAddress};
use crate::domain::donation::DonorData;
use crate::domain::foundation::{ContactId, DomainError, TenantId};
use crate::ports::{ContactRepository, ResolvedContact};

#[derive(Default)]
pub(crate) struct ContactStore {
    pub contacts: Vec<Contact>,
    pub emails: Vec<EmailAddress>,
    pub phones: Vec<PhoneNumber>,
    pub locations: Vec<Location>,
    pub employers: Vec<EmployerRecord>,
    pub tenant_links: Vec<(TenantId, ContactId)>,
}

/// In-memory implementation of the ContactRepository port.
#[derive(Default)]
pub struct InMemoryContactRepository {
    pub(crate) store: Mutex<ContactStore>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a contact with one email address; returns its id.
    pub fn seed_contact(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> ContactId {
        let mut store = self.store.lock().unwrap();
        let contact = Contact::new(
            ContactId::new(),
            first_name.map(String::from),
            last_name.map(String::from),
        );
        let id = contact.id;
        store.emails.push(EmailAddress::new(id, email));
        store.contacts.push(contact);
        id
    }

    pub fn contact_count(&self) -> usize {
        self.store.lock().unwrap().contacts.len()
    }

    pub fn emails_for(&self, contact_id: ContactId) -> Vec<String> {
        self.store
            .lock()
            .unwrap()
            .emails
            .iter()
            .filter(|e| e.contact_id == contact_id)
            .map(|e| e.address.clone())
            .collect()
    }

    pub fn merged_into(&self, contact_id: ContactId) -> Option<ContactId> {
        self.store
            .lock()
            .unwrap()
            .contacts
            .iter()
            .find(|c| c.id == contact_id)
            .and_then(|c| c.merged_into)
    }

    pub fn tenant_links(&self) -> Vec<(TenantId, ContactId)> {
        self.store.lock().unwrap().tenant_links.clone()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError> {
        let store = self.store.lock().unwrap();
        let owner = store
            .emails
            .iter()
            .find(|e| e.address == email)
            .map(|e| e.contact_id);
        Ok(owner.and_then(|id| store.contacts.iter().find(|c| c.id == id).cloned()))
    }

    async fn find_by_id(&self, id: ContactId) -> Result<Option<Contact>, DomainError> {
        Ok(self
            .store
            .lock()
            .unwrap()
            .contacts
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_or_create_by_email(
        &self,
        email: &str,
        donor: &DonorData,
    ) -> Result<ResolvedContact, DomainError> {
        let mut store = self.store.lock().unwrap();

        // The lock is held across lookup and insert, so the sequence is
        // atomic like its SQL counterpart.
        if let Some(owner) = store
            .emails
            .iter()
            .find(|e| e.address == email)
            .map(|e| e.contact_id)
        {
            let contact = store
                .contacts
                .iter_mut()
                .find(|c| c.id == owner)
                .ok_or_else(|| DomainError::not_found("contact"))?;
            contact.apply_donor_update(donor.first_name.as_deref(), donor.last_name.as_deref());
            return Ok(ResolvedContact {
                contact: contact.clone(),
                created: false,
            });
        }

        let contact = Contact::new(
            ContactId::new(),
            donor.first_name.clone(),
            donor.last_name.clone(),
        );
        store.emails.push(EmailAddress::new(contact.id, email));
        store.contacts.push(contact.clone());
        Ok(ResolvedContact {
            contact,
            created: true,
        })
    }

    async fn update_from_donor(
        &self,
        contact_id: ContactId,
        donor: &DonorData,
    ) -> Result<Contact, DomainError> {
        let mut store = self.store.lock().unwrap();
        let contact = store
            .contacts
            .iter_mut()
            .find(|c| c.id == contact_id)
            .ok_or_else(|| DomainError::not_found("contact"))?;
        contact.apply_donor_update(donor.first_name.as_deref(), donor.last_name.as_deref());
        Ok(contact.clone())
    }

    async fn attach_email(&self, contact_id: ContactId, email: &str) -> Result<(), DomainError> {
        let mut store = self.store.lock().unwrap();
        if store.emails.iter().any(|e| e.address == email) {
            return Ok(());
        }
        let has_primary = store
            .emails
            .iter()
            .any(|e| e.contact_id == contact_id && e.is_primary);
        let mut record = EmailAddress::new(contact_id, email);
        record.is_primary = !has_primary;
        store.emails.push(record);
        Ok(())
    }

    async fn add_phone(&self, phone: &PhoneNumber) -> Result<(), DomainError> {
        let mut store = self.store.lock().unwrap();
        let has_primary = store
            .phones
            .iter()
            .any(|p| p.contact_id == phone.contact_id && p.is_primary);
        let mut record = phone.clone();
        record.is_primary = !has_primary;
        store.phones.push(record);
        Ok(())
    }

    async fn add_location(&self, location: &Location) -> Result<(), DomainError> {
        let mut store = self.store.lock().unwrap();
        let has_primary = store
            .locations
            .iter()
            .any(|l| l.contact_id == location.contact_id && l.is_primary);
        let mut record = location.clone();
        record.is_primary = !has_primary;
        store.locations.push(record);
        Ok(())
    }

    async fn add_employer(&self, record: &EmployerRecord) -> Result<(), DomainError> {
        self.store.lock().unwrap().employers.push(record.clone());
        Ok(())
    }

    async fn link_tenant(
        &self,
        tenant_id: TenantId,
        contact_id: ContactId,
    ) -> Result<(), DomainError> {
        let mut store = self.store.lock().unwrap();
        if !store.tenant_links.contains(&(tenant_id, contact_id)) {
            store.tenant_links.push((tenant_id, contact_id));
        }
        Ok(())
    }

    async fn promote_to_donor(&self, contact_id: ContactId) -> Result<(), DomainError> {
        let mut store = self.store.lock().unwrap();
        if let Some(contact) = store.contacts.iter_mut().find(|c| c.id == contact_id) {
            contact.promote_to_donor();
        }
        Ok(())
    }

    async fn list_snapshots_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ContactSnapshot>, DomainError> {
        let store = self.store.lock().unwrap();
        let snapshots = store
            .contacts
            .iter()
            .filter(|c| c.merged_into.is_none())
            .filter(|c| store.tenant_links.contains(&(tenant_id, c.id)))
            .map(|c| ContactSnapshot {
                id: c.id,
                first_name: c.first_name.clone(),
                last_name: c.last_name.clone(),
                emails: store
                    .emails
                    .iter()
                    .filter(|e| e.contact_id == c.id)
                    .map(|e| e.address.clone())
                    .collect(),
                phones: store
                    .phones
                    .iter()
                    .filter(|p| p.contact_id == c.id)
                    .map(|p| p.number.clone())
                    .collect(),
                addresses: store
                    .locations
                    .iter()
                    .filter(|l| l.contact_id == c.id)
                    .map(|l| SnapshotAddress {
                        street: l.street.clone(),
                        city: l.city.clone(),
                        state: l.state.clone(),
                        zip: l.zip.clone(),
                    })
                    .collect(),
            })
            .collect();
        Ok(snapshots)
    }
}
