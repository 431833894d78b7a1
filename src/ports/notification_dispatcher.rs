//! Notification dispatcher port.
//!
//! Ingestion dispatches one notification per recorded donation,
//! fire-and-forget: the dispatcher's failure must never affect the webhook
//! response.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::{ContactId, DomainError, DonationId, TenantId};

/// Payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonationNotification {
    pub tenant_id: Option<TenantId>,
    pub donation_id: DonationId,
    pub amount: Decimal,
    pub contact_id: Option<ContactId>,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    /// "recurring" or "one-time".
    pub donation_type: String,
}

/// Port for the out-of-scope notification collaborator.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, notification: DonationNotification) -> Result<(), DomainError>;
}
