//! Raw webhook payload model.
//!
//! Third-party donation providers send loosely-typed JSON: numbers arrive as
//! strings, booleans as `"true"`/`"false"`, and several fields are optional
//! or absent depending on the provider version. The payload is modeled as an
//! explicitly typed structure at the boundary; fields whose type varies in
//! the wild are carried as `serde_json::Value` and coerced by the
//! normalizer, which owns every coercion rule. Anything that does not fit
//! this shape is rejected before it reaches the pipeline.

use serde::Deserialize;
use serde_json::Value;

/// Top-level webhook body: `{ donor?, contribution, lineitems? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub donor: Option<DonorPayload>,
    pub contribution: ContributionPayload,
    #[serde(default)]
    pub lineitems: Option<Vec<LineItemPayload>>,
}

/// Donor block: identity plus contact channels and optional employer data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorPayload {
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub addr1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub employer_data: Option<EmployerPayload>,
    /// Boolean-ish provider flag; coerced by the normalizer.
    #[serde(default)]
    pub is_eligible_for_express_lane: Option<Value>,
}

/// Employer block nested under the donor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerPayload {
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub employer_addr1: Option<String>,
    #[serde(default)]
    pub employer_city: Option<String>,
    #[serde(default)]
    pub employer_state: Option<String>,
    #[serde(default)]
    pub employer_zip: Option<String>,
    #[serde(default)]
    pub employer_country: Option<String>,
}

/// Contribution block: the donation itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPayload {
    /// Provider order reference; string or number on the wire.
    #[serde(default)]
    pub order_number: Option<Value>,
    /// Primary amount candidate; string or number on the wire.
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Boolean or "true"/"false" string.
    #[serde(default)]
    pub is_recurring: Option<Value>,
    #[serde(default)]
    pub recurring_period: Option<String>,
    /// Integer, numeric string, or the strings "infinite"/"Infinity".
    #[serde(default)]
    pub recurring_duration: Option<Value>,
    #[serde(default)]
    pub is_mobile: Option<Value>,
    #[serde(default)]
    pub is_express: Option<Value>,
    #[serde(default)]
    pub is_paypal: Option<Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomFieldPayload>>,
    #[serde(default)]
    pub merchandise: Option<Vec<MerchandisePayload>>,
    // Optional provider-specific passthroughs.
    #[serde(default)]
    pub shipping_name: Option<String>,
    #[serde(default)]
    pub shipping_addr1: Option<String>,
    #[serde(default)]
    pub shipping_city: Option<String>,
    #[serde(default)]
    pub shipping_state: Option<String>,
    #[serde(default)]
    pub shipping_zip: Option<String>,
    #[serde(default)]
    pub shipping_country: Option<String>,
    #[serde(default)]
    pub gift_note: Option<String>,
    /// Numeric add-on amount; malformed values degrade to null.
    #[serde(default)]
    pub smart_boost_amount: Option<Value>,
}

/// Custom field entry under the contribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Merchandise entry under the contribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchandisePayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
}

/// Line item block: per-committee split of the contribution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub recurring_amount: Option<Value>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub committee_name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<Value>,
    #[serde(default)]
    pub lineitem_id: Option<Value>,
}
