//! Donation entity and its secondary records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ContactId, DonationId, Timestamp};

/// Sentinel `recurring_duration` meaning the commitment has no end date.
pub const UNBOUNDED_RECURRING_DURATION: i32 = 9999;

/// How often a recurring donation repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurringPeriod {
    Once,
    Weekly,
    Monthly,
}

impl RecurringPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringPeriod::Once => "once",
            RecurringPeriod::Weekly => "weekly",
            RecurringPeriod::Monthly => "monthly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, RecurringPeriod::Once)
    }
}

/// A free-form name/value pair the provider attached to the contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

/// A merchandise line item sold alongside the contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchandiseItem {
    pub name: String,
    pub quantity: i32,
    pub amount: Option<Decimal>,
}

/// Shipping details for merchandise, passed through from the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

impl ShippingInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.country.is_none()
    }
}

/// A recorded donation. `contact_id` is `None` for anonymous gifts.
#[derive(Debug, Clone, PartialEq)]
pub struct Donation {
    pub id: DonationId,
    pub contact_id: Option<ContactId>,
    pub amount: Decimal,
    pub paid_at: Timestamp,
    pub recurring_period: RecurringPeriod,
    pub recurring_duration: i32,
    pub order_number: Option<String>,
    pub status: Option<String>,
    pub is_mobile: bool,
    pub is_express: bool,
    pub is_paypal: bool,
    pub smart_boost_amount: Option<Decimal>,
    pub shipping: Option<ShippingInfo>,
    pub gift_note: Option<String>,
    pub created_at: Timestamp,
}

impl Donation {
    /// True when the donation repeats with no configured end.
    pub fn is_unbounded_recurring(&self) -> bool {
        self.recurring_period.is_recurring()
            && self.recurring_duration == UNBOUNDED_RECURRING_DURATION
    }
}
