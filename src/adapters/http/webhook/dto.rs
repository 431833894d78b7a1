//! HTTP DTOs for the webhook endpoint.
//!
//! These types define the JSON response structure of the donation webhook.
//! The request body is parsed directly into the domain's payload model.

use serde::Serialize;

use crate::domain::contact::Contact;
use crate::domain::donation::Donation;
use crate::domain::foundation::{RequestId, Timestamp};

/// Success response for an ingested donation.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookSuccessResponse {
    pub success: bool,
    pub message: String,
    pub donation: DonationView,
    /// Null for anonymous gifts.
    pub donor: Option<DonorView>,
    pub request_id: RequestId,
    pub timestamp: Timestamp,
}

impl WebhookSuccessResponse {
    pub fn new(donation: DonationView, donor: Option<DonorView>, request_id: RequestId) -> Self {
        Self {
            success: true,
            message: "donation recorded".to_string(),
            donation,
            donor,
            request_id,
            timestamp: Timestamp::now(),
        }
    }
}

/// Donation details echoed back to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct DonationView {
    pub id: String,
    /// Decimal amount as a string to avoid float drift.
    pub amount: String,
    pub paid_at: String,
    pub recurring_period: &'static str,
    pub recurring_duration: i32,
    pub order_number: Option<String>,
    pub status: Option<String>,
}

impl From<&Donation> for DonationView {
    fn from(donation: &Donation) -> Self {
        Self {
            id: donation.id.to_string(),
            amount: donation.amount.to_string(),
            paid_at: donation.paid_at.to_rfc3339(),
            recurring_period: donation.recurring_period.as_str(),
            recurring_duration: donation.recurring_duration,
            order_number: donation.order_number.clone(),
            status: donation.status.clone(),
        }
    }
}

/// Resolved donor details echoed back to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct DonorView {
    pub contact_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: crate::domain::contact::ContactStatus,
}

impl From<&Contact> for DonorView {
    fn from(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id.to_string(),
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            status: contact.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::donation::RecurringPeriod;
    use crate::domain::foundation::DonationId;

    fn donation() -> Donation {
        Donation {
            id: DonationId::new(),
            contact_id: None,
            amount: "25.00".parse().unwrap(),
            paid_at: Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").unwrap(),
            recurring_period: RecurringPeriod::Once,
            recurring_duration: 0,
            order_number: Some("100123".into()),
            status: Some("approved".into()),
            is_mobile: false,
            is_express: false,
            is_paypal: false,
            smart_boost_amount: None,
            shipping: None,
            gift_note: None,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn success_response_serializes_contract_fields() {
        let view = DonationView::from(&donation());
        let response = WebhookSuccessResponse::new(view, None, RequestId::new());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["donation"]["amount"], "25.00");
        assert_eq!(json["donation"]["recurring_period"], "once");
        assert!(json["donor"].is_null());
        assert!(json.get("request_id").is_some());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn donation_view_preserves_decimal_text() {
        let view = DonationView::from(&donation());
        assert_eq!(view.amount, "25.00");
    }
}
