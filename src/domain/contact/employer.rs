//! Employer details a donor may disclose with a contribution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{ContactId, Timestamp};

/// Employment information attached to a contact. All fields are optional;
/// a record is only written when at least one field is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployerData {
    pub employer: Option<String>,
    pub occupation: Option<String>,
    pub employer_street: Option<String>,
    pub employer_city: Option<String>,
    pub employer_state: Option<String>,
    pub employer_zip: Option<String>,
    pub employer_country: Option<String>,
}

impl EmployerData {
    /// True when no employer field is present.
    pub fn is_empty(&self) -> bool {
        self.employer.is_none()
            && self.occupation.is_none()
            && self.employer_street.is_none()
            && self.employer_city.is_none()
            && self.employer_state.is_none()
            && self.employer_zip.is_none()
            && self.employer_country.is_none()
    }
}

/// A persisted employer record.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployerRecord {
    pub id: Uuid,
    pub contact_id: ContactId,
    pub data: EmployerData,
    pub created_at: Timestamp,
}

impl EmployerRecord {
    pub fn new(contact_id: ContactId, data: EmployerData) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            data,
            created_at: Timestamp::now(),
        }
    }
}
