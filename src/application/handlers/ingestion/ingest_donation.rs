//! IngestDonationHandler - Command handler for the donation ingestion pipeline.
//!
//! Orchestrates normalization, identity resolution, donation recording, and
//! the fire-and-forget notification. Fatal steps (contact/email writes, the
//! donation insert) abort the request; ancillary writes (tenant link,
//! location, employer, custom fields, merchandise) and the notification are
//! logged and absorbed.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::contact::{Contact, EmployerData, EmployerRecord, Location, PhoneNumber};
use crate::domain::dedupe::{find_inline_match, ContactSnapshot, SnapshotAddress};
use crate::domain::donation::{
    normalize, Donation, DonationData, DonorData, DonorPayload, WebhookPayload,
};
use crate::domain::foundation::{DomainError, DonationId, TenantId};
use crate::ports::{
    ContactRepository, DonationNotification, DonationRepository, NotificationDispatcher,
};

/// Command to ingest one donation webhook event.
#[derive(Debug, Clone)]
pub struct IngestDonationCommand {
    /// Tenant resolved by the credential validator, when the webhook is
    /// tenant-scoped.
    pub tenant_id: Option<TenantId>,
    /// The parsed (not yet normalized) webhook body.
    pub payload: WebhookPayload,
}

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestDonationResult {
    pub donation: Donation,
    /// The resolved contact, or `None` for an anonymous gift.
    pub contact: Option<Contact>,
}

/// Handler for the ingestion pipeline.
pub struct IngestDonationHandler {
    contacts: Arc<dyn ContactRepository>,
    donations: Arc<dyn DonationRepository>,
    notifications: Arc<dyn NotificationDispatcher>,
}

impl IngestDonationHandler {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        donations: Arc<dyn DonationRepository>,
        notifications: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            contacts,
            donations,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        cmd: IngestDonationCommand,
    ) -> Result<IngestDonationResult, DomainError> {
        // 1. Normalize the payload
        let event = normalize(&cmd.payload)?;

        // 2. Resolve the donor to a contact; no email means anonymous
        let donor_email = cmd
            .payload
            .donor
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let contact = match (&donor_email, cmd.payload.donor.as_ref(), event.donor.as_ref()) {
            (Some(email), Some(raw_donor), Some(donor)) => Some(
                self.resolve_contact(email, raw_donor, donor, cmd.tenant_id)
                    .await?,
            ),
            _ => None,
        };

        // 3. Record the donation (fatal on failure)
        let donation = build_donation(contact.as_ref().map(|c| c.id), &event.donation);
        self.donations.insert(&donation).await?;

        // 4. Promote the contact to donor status, best-effort
        if let Some(contact) = &contact {
            if let Err(err) = self.contacts.promote_to_donor(contact.id).await {
                warn!(contact_id = %contact.id, %err, "failed to promote contact status");
            }
        }

        // 5. Best-effort secondary records
        if !event.donation.custom_fields.is_empty() {
            if let Err(err) = self
                .donations
                .add_custom_fields(donation.id, &event.donation.custom_fields)
                .await
            {
                warn!(donation_id = %donation.id, %err, "failed to store custom fields");
            }
        }
        if !event.donation.merchandise.is_empty() {
            if let Err(err) = self
                .donations
                .add_merchandise(donation.id, &event.donation.merchandise)
                .await
            {
                warn!(donation_id = %donation.id, %err, "failed to store merchandise");
            }
        }

        // 6. Fire-and-forget notification
        self.dispatch_notification(cmd.tenant_id, &donation, contact.as_ref(), &donor_email);

        Ok(IngestDonationResult { donation, contact })
    }

    /// Finds or creates the canonical contact for a donor with an email.
    ///
    /// Lookup order: exact email match, then the inline high-confidence
    /// matcher over the tenant's contacts, then an atomic create.
    async fn resolve_contact(
        &self,
        email: &str,
        raw_donor: &DonorPayload,
        donor: &DonorData,
        tenant_id: Option<TenantId>,
    ) -> Result<Contact, DomainError> {
        let (contact, created) = match self.contacts.find_by_email(email).await? {
            Some(existing) => {
                let updated = self.contacts.update_from_donor(existing.id, donor).await?;
                (updated, false)
            }
            None => match self.try_inline_match(email, raw_donor, donor, tenant_id).await {
                Some(matched_id) => {
                    self.contacts.attach_email(matched_id, email).await?;
                    let updated = self.contacts.update_from_donor(matched_id, donor).await?;
                    (updated, false)
                }
                None => {
                    let resolved = self.contacts.find_or_create_by_email(email, donor).await?;
                    (resolved.contact, resolved.created)
                }
            },
        };

        // Tenant link: a pre-existing pair is a no-op, a failure is absorbed
        if let Some(tenant_id) = tenant_id {
            if let Err(err) = self.contacts.link_tenant(tenant_id, contact.id).await {
                warn!(contact_id = %contact.id, %tenant_id, %err, "failed to link tenant");
            }
        }

        // Phone only accompanies a freshly created contact; re-inserting it
        // on every donation would pile up duplicate rows
        if created {
            if let Some(phone) = raw_donor.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
            {
                let record = PhoneNumber::new(contact.id, phone);
                if let Err(err) = self.contacts.add_phone(&record).await {
                    warn!(contact_id = %contact.id, %err, "failed to store phone");
                }
            }
        }

        // Location and employer rows are written whenever present, absorbed
        // on failure
        let location = location_from_donor(contact.id, raw_donor);
        if !location.is_empty() {
            if let Err(err) = self.contacts.add_location(&location).await {
                warn!(contact_id = %contact.id, %err, "failed to store location");
            }
        }

        let employer = employer_from_donor(raw_donor);
        if !employer.is_empty() {
            let record = EmployerRecord::new(contact.id, employer);
            if let Err(err) = self.contacts.add_employer(&record).await {
                warn!(contact_id = %contact.id, %err, "failed to store employer data");
            }
        }

        Ok(contact)
    }

    /// Runs the inline matcher over the tenant's contacts. Any failure here
    /// degrades to "no match": the pipeline then takes the create path.
    async fn try_inline_match(
        &self,
        email: &str,
        raw_donor: &DonorPayload,
        donor: &DonorData,
        tenant_id: Option<TenantId>,
    ) -> Option<crate::domain::foundation::ContactId> {
        let tenant_id = tenant_id?;
        let candidates = match self.contacts.list_snapshots_for_tenant(tenant_id).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(%tenant_id, %err, "failed to load snapshots for inline matching");
                return None;
            }
        };

        let incoming = snapshot_from_donor(email, raw_donor, donor);
        let hit = find_inline_match(&incoming, &candidates)?;
        info!(
            contact_id = %hit.candidate.id,
            confidence = hit.scores.confidence,
            "inline matcher attached incoming donor to existing contact"
        );
        Some(hit.candidate.id)
    }

    fn dispatch_notification(
        &self,
        tenant_id: Option<TenantId>,
        donation: &Donation,
        contact: Option<&Contact>,
        donor_email: &Option<String>,
    ) {
        let notification = DonationNotification {
            tenant_id,
            donation_id: donation.id,
            amount: donation.amount,
            contact_id: donation.contact_id,
            donor_name: contact.map(|c| c.display_name()),
            donor_email: donor_email.clone(),
            donation_type: if donation.recurring_period.is_recurring() {
                "recurring".to_string()
            } else {
                "one-time".to_string()
            },
        };

        let dispatcher = Arc::clone(&self.notifications);
        tokio::spawn(async move {
            if let Err(err) = dispatcher.dispatch(notification).await {
                warn!(%err, "donation notification dispatch failed");
            }
        });
    }
}

fn build_donation(contact_id: Option<crate::domain::foundation::ContactId>, data: &DonationData) -> Donation {
    Donation {
        id: DonationId::new(),
        contact_id,
        amount: data.amount,
        paid_at: data.paid_at,
        recurring_period: data.recurring_period,
        recurring_duration: data.recurring_duration,
        order_number: data.order_number.clone(),
        status: data.status.clone(),
        is_mobile: data.is_mobile,
        is_express: data.is_express,
        is_paypal: data.is_paypal,
        smart_boost_amount: data.smart_boost_amount,
        shipping: data.shipping.clone(),
        gift_note: data.gift_note.clone(),
        created_at: crate::domain::foundation::Timestamp::now(),
    }
}

fn snapshot_from_donor(email: &str, raw_donor: &DonorPayload, donor: &DonorData) -> ContactSnapshot {
    let address = SnapshotAddress {
        street: raw_donor.addr1.clone(),
        city: raw_donor.city.clone(),
        state: raw_donor.state.clone(),
        zip: raw_donor.zip.clone(),
    };
    let has_address = address.street.is_some()
        || address.city.is_some()
        || address.state.is_some()
        || address.zip.is_some();

    ContactSnapshot {
        id: crate::domain::foundation::ContactId::new(),
        first_name: donor.first_name.clone(),
        last_name: donor.last_name.clone(),
        emails: vec![email.to_string()],
        phones: raw_donor.phone.iter().cloned().collect(),
        addresses: if has_address { vec![address] } else { vec![] },
    }
}

fn location_from_donor(
    contact_id: crate::domain::foundation::ContactId,
    raw_donor: &DonorPayload,
) -> Location {
    let mut location = Location::new(contact_id);
    location.street = raw_donor.addr1.clone();
    location.city = raw_donor.city.clone();
    location.state = raw_donor.state.clone();
    location.zip = raw_donor.zip.clone();
    location.country = raw_donor.country.clone();
    location
}

fn employer_from_donor(raw_donor: &DonorPayload) -> EmployerData {
    raw_donor
        .employer_data
        .as_ref()
        .map(|e| EmployerData {
            employer: e.employer.clone(),
            occupation: e.occupation.clone(),
            employer_street: e.employer_addr1.clone(),
            employer_city: e.employer_city.clone(),
            employer_state: e.employer_state.clone(),
            employer_zip: e.employer_zip.clone(),
            employer_country: e.employer_country.clone(),
        })
        .unwrap_or_default()
}
