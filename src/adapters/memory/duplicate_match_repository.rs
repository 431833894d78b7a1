//! In-memory implementation of DuplicateMatchRepository.
//!
//! When constructed with a handle to the in-memory contact store, merge
//! resolutions perform the same consolidation the PostgreSQL transaction
//! does: channel rows, donations left to the donation store, and tenant
//! links move to the primary, and the secondary is soft-deactivated.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::contact::{choose_promotion, ChannelRow};
use crate::domain::dedupe::{DuplicateMatch, MergeHistory};
use crate::domain::foundation::{ContactId, DomainError, DuplicateMatchId, TenantId};
use crate::ports::DuplicateMatchRepository;

use super::contact_repository::InMemoryContactRepository;

/// In-memory implementation of the DuplicateMatchRepository port.
#[derive(Default)]
pub struct InMemoryDuplicateMatchRepository {
    matches: Mutex<Vec<DuplicateMatch>>,
    histories: Mutex<Vec<MergeHistory>>,
    contacts: Option<Arc<InMemoryContactRepository>>,
}

impl InMemoryDuplicateMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Couples merge resolutions to an in-memory contact store so they
    /// consolidate contact data like the SQL implementation.
    pub fn with_contacts(contacts: Arc<InMemoryContactRepository>) -> Self {
        Self {
            matches: Mutex::new(Vec::new()),
            histories: Mutex::new(Vec::new()),
            contacts: Some(contacts),
        }
    }

    pub fn unresolved_count(&self) -> usize {
        self.matches
            .lock()
            .unwrap()
            .iter()
            .filter(|m| !m.resolved)
            .count()
    }

    pub fn histories(&self) -> Vec<MergeHistory> {
        self.histories.lock().unwrap().clone()
    }

    pub fn all_matches(&self) -> Vec<DuplicateMatch> {
        self.matches.lock().unwrap().clone()
    }
}

#[async_trait]
impl DuplicateMatchRepository for InMemoryDuplicateMatchRepository {
    async fn insert_if_absent(&self, candidate: &DuplicateMatch) -> Result<bool, DomainError> {
        let mut matches = self.matches.lock().unwrap();
        let key = candidate.pair_key();
        if matches.iter().any(|m| !m.resolved && m.pair_key() == key) {
            return Ok(false);
        }
        matches.push(candidate.clone());
        Ok(true)
    }

    async fn find_by_id(
        &self,
        id: DuplicateMatchId,
    ) -> Result<Option<DuplicateMatch>, DomainError> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn list_unresolved(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<DuplicateMatch>, DomainError> {
        let tenant_contacts: Option<Vec<ContactId>> = self
            .contacts
            .as_ref()
            .map(|repo| {
                repo.tenant_links()
                    .into_iter()
                    .filter(|(t, _)| *t == tenant_id)
                    .map(|(_, c)| c)
                    .collect()
            });

        let mut unresolved: Vec<DuplicateMatch> = self
            .matches
            .lock()
            .unwrap()
            .iter()
            .filter(|m| !m.resolved)
            .filter(|m| match &tenant_contacts {
                Some(ids) => ids.contains(&m.contact1_id) || ids.contains(&m.contact2_id),
                None => true,
            })
            .cloned()
            .collect();
        unresolved.sort_by(|a, b| b.scores.confidence.cmp(&a.scores.confidence));
        Ok(unresolved)
    }

    async fn record_ignore(&self, resolved: &DuplicateMatch) -> Result<(), DomainError> {
        let mut matches = self.matches.lock().unwrap();
        let stored = matches
            .iter_mut()
            .find(|m| m.id == resolved.id)
            .ok_or_else(|| DomainError::not_found("duplicate match"))?;
        if stored.resolved {
            return Err(DomainError::validation(
                "duplicate_id",
                "duplicate match is already resolved",
            ));
        }
        *stored = resolved.clone();
        Ok(())
    }

    async fn record_merge(
        &self,
        resolved: &DuplicateMatch,
        primary_id: ContactId,
        secondary_id: ContactId,
        history: &MergeHistory,
    ) -> Result<(), DomainError> {
        self.record_ignore(resolved).await?;
        self.histories.lock().unwrap().push(history.clone());

        if let Some(contacts) = &self.contacts {
            let mut store = contacts.store.lock().unwrap();

            let primary_has_primary_email = store
                .emails
                .iter()
                .any(|e| e.contact_id == primary_id && e.is_primary);
            for email in store.emails.iter_mut().filter(|e| e.contact_id == secondary_id) {
                if primary_has_primary_email {
                    email.is_primary = false;
                }
                email.contact_id = primary_id;
            }

            let primary_has_primary_phone = store
                .phones
                .iter()
                .any(|p| p.contact_id == primary_id && p.is_primary);
            for phone in store.phones.iter_mut().filter(|p| p.contact_id == secondary_id) {
                if primary_has_primary_phone {
                    phone.is_primary = false;
                }
                phone.contact_id = primary_id;
            }

            let primary_has_primary_location = store
                .locations
                .iter()
                .any(|l| l.contact_id == primary_id && l.is_primary);
            for location in store
                .locations
                .iter_mut()
                .filter(|l| l.contact_id == secondary_id)
            {
                if primary_has_primary_location {
                    location.is_primary = false;
                }
                location.contact_id = primary_id;
            }

            for employer in store
                .employers
                .iter_mut()
                .filter(|e| e.contact_id == secondary_id)
            {
                employer.contact_id = primary_id;
            }

            let moved_links: Vec<TenantId> = store
                .tenant_links
                .iter()
                .filter(|(_, c)| *c == secondary_id)
                .map(|(t, _)| *t)
                .collect();
            store.tenant_links.retain(|(_, c)| *c != secondary_id);
            for tenant in moved_links {
                if !store.tenant_links.contains(&(tenant, primary_id)) {
                    store.tenant_links.push((tenant, primary_id));
                }
            }

            // Promote a replacement primary wherever the merge left none,
            // using the shared selection rule.
            let email_rows: Vec<ChannelRow> = store
                .emails
                .iter()
                .filter(|e| e.contact_id == primary_id)
                .map(|e| ChannelRow {
                    id: e.id,
                    is_primary: e.is_primary,
                    verified: e.verified,
                    created_at: e.created_at,
                })
                .collect();
            if let Some(promote) = choose_promotion(&email_rows) {
                if let Some(email) = store.emails.iter_mut().find(|e| e.id == promote) {
                    email.is_primary = true;
                }
            }

            let phone_rows: Vec<ChannelRow> = store
                .phones
                .iter()
                .filter(|p| p.contact_id == primary_id)
                .map(|p| ChannelRow {
                    id: p.id,
                    is_primary: p.is_primary,
                    verified: p.verified,
                    created_at: p.created_at,
                })
                .collect();
            if let Some(promote) = choose_promotion(&phone_rows) {
                if let Some(phone) = store.phones.iter_mut().find(|p| p.id == promote) {
                    phone.is_primary = true;
                }
            }

            let location_rows: Vec<ChannelRow> = store
                .locations
                .iter()
                .filter(|l| l.contact_id == primary_id)
                .map(|l| ChannelRow {
                    id: l.id,
                    is_primary: l.is_primary,
                    verified: l.verified,
                    created_at: l.created_at,
                })
                .collect();
            if let Some(promote) = choose_promotion(&location_rows) {
                if let Some(location) = store.locations.iter_mut().find(|l| l.id == promote) {
                    location.is_primary = true;
                }
            }

            if let Some(secondary) = store.contacts.iter_mut().find(|c| c.id == secondary_id) {
                secondary.merged_into = Some(primary_id);
            }
        }

        Ok(())
    }
}
