//! The canonical person record a donation can be attributed to.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, Timestamp};

/// Lifecycle status of a contact.
///
/// Contacts enter as prospects and are promoted to `Donor` the first time a
/// donation is attributed to them. `Active` is reserved for contacts engaged
/// through channels other than giving (managed by the UI, out of scope here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Prospect,
    Active,
    Donor,
}

/// Canonical contact record.
///
/// A contact that has been merged away keeps its row for FK history but
/// carries `merged_into` pointing at the surviving primary; such contacts are
/// excluded from duplicate scans and inline matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: ContactStatus,
    pub merged_into: Option<ContactId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Contact {
    /// Creates a fresh prospect contact.
    pub fn new(id: ContactId, first_name: Option<String>, last_name: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            first_name,
            last_name,
            status: ContactStatus::Prospect,
            merged_into: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the mutable fields carried by a donor payload.
    ///
    /// Names are only overwritten when the payload supplies a non-empty
    /// value; an incoming donation never erases a known name.
    pub fn apply_donor_update(&mut self, first_name: Option<&str>, last_name: Option<&str>) {
        if let Some(first) = first_name.filter(|s| !s.trim().is_empty()) {
            self.first_name = Some(first.trim().to_string());
        }
        if let Some(last) = last_name.filter(|s| !s.trim().is_empty()) {
            self.last_name = Some(last.trim().to_string());
        }
        self.updated_at = Timestamp::now();
    }

    /// Promotes the contact to donor status once a donation is attributed.
    pub fn promote_to_donor(&mut self) {
        if self.status != ContactStatus::Donor {
            self.status = ContactStatus::Donor;
            self.updated_at = Timestamp::now();
        }
    }

    /// True when this contact has been merged into another.
    pub fn is_merged_away(&self) -> bool {
        self.merged_into.is_some()
    }

    /// Display name assembled from whatever name parts exist.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => format!("{} {}", f, l),
            (Some(f), None) => f.clone(),
            (None, Some(l)) => l.clone(),
            (None, None) => "Anonymous".to_string(),
        }
    }
}
