//! Contact channels: email addresses, phone numbers, postal locations.
//!
//! Each channel row belongs to exactly one contact and carries a free-form
//! `kind` ("main", "home", ...), an `is_primary` flag, and a `verified` flag.
//! Invariant: at most one row per contact per channel has `is_primary = true`.
//! Promotion of a replacement primary happens in the same transaction as any
//! primary removal; [`choose_promotion`] is the shared selection rule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ContactId, Timestamp};

/// An email address attached to a contact.
///
/// `address` is globally unique at the storage layer; it is the identity key
/// the ingestion pipeline resolves donors by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub id: Uuid,
    pub contact_id: ContactId,
    pub address: String,
    pub kind: String,
    pub is_primary: bool,
    pub verified: bool,
    pub created_at: Timestamp,
}

impl EmailAddress {
    pub fn new(contact_id: ContactId, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            address: address.into(),
            kind: "main".to_string(),
            is_primary: true,
            verified: false,
            created_at: Timestamp::now(),
        }
    }
}

/// A phone number attached to a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: Uuid,
    pub contact_id: ContactId,
    pub number: String,
    pub kind: String,
    pub is_primary: bool,
    pub verified: bool,
    pub created_at: Timestamp,
}

impl PhoneNumber {
    pub fn new(contact_id: ContactId, number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            number: number.into(),
            kind: "main".to_string(),
            is_primary: true,
            verified: false,
            created_at: Timestamp::now(),
        }
    }
}

/// A postal location attached to a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub contact_id: ContactId,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub kind: String,
    pub is_primary: bool,
    pub verified: bool,
    pub created_at: Timestamp,
}

impl Location {
    pub fn new(contact_id: ContactId) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            street: None,
            city: None,
            state: None,
            zip: None,
            country: None,
            kind: "main".to_string(),
            is_primary: true,
            verified: false,
            created_at: Timestamp::now(),
        }
    }

    /// True when no address component is present.
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
    }
}

/// Minimal view of a channel row used by the promotion rule.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRow {
    pub id: Uuid,
    pub is_primary: bool,
    pub verified: bool,
    pub created_at: Timestamp,
}

/// Picks the row to promote when a contact is left without a primary.
///
/// Returns `None` when a primary still exists or there is nothing to promote.
/// Preference order: verified rows first, then the oldest row.
pub fn choose_promotion(rows: &[ChannelRow]) -> Option<Uuid> {
    if rows.iter().any(|r| r.is_primary) {
        return None;
    }
    rows.iter()
        .min_by_key(|r| (!r.verified, r.created_at))
        .map(|r| r.id)
}
