//! Donation domain: raw payload model, normalization, and the entity.

mod donation;
mod normalizer;
mod payload;

pub use donation::{
    CustomField, Donation, MerchandiseItem, RecurringPeriod, ShippingInfo,
    UNBOUNDED_RECURRING_DURATION,
};
pub use normalizer::{normalize, DonationData, DonorData, NormalizedEvent};
pub use payload::{
    ContributionPayload, CustomFieldPayload, DonorPayload, EmployerPayload, LineItemPayload,
    MerchandisePayload, WebhookPayload,
};
