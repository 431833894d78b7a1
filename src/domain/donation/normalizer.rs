//! Payload normalization: raw provider JSON into canonical donation data.
//!
//! Every coercion rule the pipeline applies lives here:
//!
//! - amount resolution: `contribution.amount` -> `lineitems[0].amount` ->
//!   `lineitems[0].recurringAmount`; the first finite non-negative value
//!   wins, an exhausted chain is fatal
//! - `recurringDuration`: "infinite"/"Infinity" -> the 9999 sentinel,
//!   numeric strings -> integer, unparsable -> 0
//! - boolean-ish flags: accepted as booleans or "true"/"false" strings
//! - `paid_at`: `lineitems[0].paidAt` -> `contribution.paidAt` ->
//!   `contribution.createdAt`, first parseable timestamp wins
//! - optional passthroughs degrade to `None` with a warning instead of
//!   failing the request

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::domain::foundation::{DomainError, ErrorKind, Timestamp};

use super::donation::{
    CustomField, MerchandiseItem, RecurringPeriod, ShippingInfo, UNBOUNDED_RECURRING_DURATION,
};
use super::payload::{ContributionPayload, LineItemPayload, WebhookPayload};

/// Canonical donation fields extracted from a webhook payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DonationData {
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
    pub custom_fields: Vec<CustomField>,
    pub merchandise: Vec<MerchandiseItem>,
}

/// Canonical donor fields: names and boolean flags only. Email, phone, and
/// address stay on the raw donor block for the identity resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_express_lane_eligible: bool,
}

/// Output of normalization: the donation plus the donor, when one was sent.
#[derive(Debug, Clone)]
pub struct NormalizedEvent {
    pub donation: DonationData,
    pub donor: Option<DonorData>,
}

/// Normalizes a parsed webhook payload into canonical shapes.
///
/// # Errors
///
/// `InvalidPayloadStructure` when no amount candidate parses to a finite
/// non-negative number, or no timestamp candidate parses.
pub fn normalize(payload: &WebhookPayload) -> Result<NormalizedEvent, DomainError> {
    let contribution = &payload.contribution;
    let first_lineitem = payload.lineitems.as_ref().and_then(|items| items.first());

    let amount = resolve_amount(contribution, first_lineitem)?;
    let paid_at = resolve_paid_at(contribution, first_lineitem)?;

    let is_recurring = contribution
        .is_recurring
        .as_ref()
        .and_then(coerce_bool)
        .unwrap_or(false);
    let recurring_period = resolve_period(is_recurring, contribution.recurring_period.as_deref());
    let recurring_duration = contribution
        .recurring_duration
        .as_ref()
        .map(coerce_duration)
        .unwrap_or(0);

    let smart_boost_amount = contribution.smart_boost_amount.as_ref().and_then(|v| {
        let parsed = coerce_decimal(v);
        if parsed.is_none() {
            warn!(value = %v, "malformed smartBoostAmount, dropping");
        }
        parsed
    });

    let shipping = Some(ShippingInfo {
        name: clean(&contribution.shipping_name),
        street: clean(&contribution.shipping_addr1),
        city: clean(&contribution.shipping_city),
        state: clean(&contribution.shipping_state),
        zip: clean(&contribution.shipping_zip),
        country: clean(&contribution.shipping_country),
    })
    .filter(|s| !s.is_empty());

    let donation = DonationData {
        amount,
        paid_at,
        recurring_period,
        recurring_duration,
        order_number: contribution.order_number.as_ref().and_then(coerce_string),
        status: clean(&contribution.status),
        is_mobile: flag(&contribution.is_mobile),
        is_express: flag(&contribution.is_express),
        is_paypal: flag(&contribution.is_paypal),
        smart_boost_amount,
        shipping,
        gift_note: clean(&contribution.gift_note),
        custom_fields: collect_custom_fields(contribution),
        merchandise: collect_merchandise(contribution),
    };

    let donor = payload.donor.as_ref().map(|d| DonorData {
        first_name: clean(&d.firstname),
        last_name: clean(&d.lastname),
        is_express_lane_eligible: d
            .is_eligible_for_express_lane
            .as_ref()
            .and_then(coerce_bool)
            .unwrap_or(false),
    });

    Ok(NormalizedEvent { donation, donor })
}

fn resolve_amount(
    contribution: &ContributionPayload,
    first_lineitem: Option<&LineItemPayload>,
) -> Result<Decimal, DomainError> {
    let candidates = [
        contribution.amount.as_ref(),
        first_lineitem.and_then(|li| li.amount.as_ref()),
        first_lineitem.and_then(|li| li.recurring_amount.as_ref()),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(amount) = coerce_decimal(candidate) {
            return Ok(amount);
        }
    }

    Err(
        DomainError::new(ErrorKind::InvalidPayloadStructure, "no usable donation amount")
            .with_detail("field", "amount"),
    )
}

fn resolve_paid_at(
    contribution: &ContributionPayload,
    first_lineitem: Option<&LineItemPayload>,
) -> Result<Timestamp, DomainError> {
    let candidates = [
        first_lineitem.and_then(|li| li.paid_at.as_deref()),
        contribution.paid_at.as_deref(),
        contribution.created_at.as_deref(),
    ];

    for candidate in candidates.into_iter().flatten() {
        match Timestamp::parse_rfc3339(candidate) {
            Ok(ts) => return Ok(ts),
            Err(err) => warn!(value = candidate, %err, "unparsable timestamp candidate"),
        }
    }

    Err(
        DomainError::new(ErrorKind::InvalidPayloadStructure, "no usable payment timestamp")
            .with_detail("field", "paid_at"),
    )
}

fn resolve_period(is_recurring: bool, period: Option<&str>) -> RecurringPeriod {
    if !is_recurring {
        return RecurringPeriod::Once;
    }
    match period.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
        Some("monthly") => RecurringPeriod::Monthly,
        Some("weekly") => RecurringPeriod::Weekly,
        _ => RecurringPeriod::Once,
    }
}

/// Parses a string-or-number JSON value into a finite non-negative decimal.
fn coerce_decimal(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                Some(Decimal::from(int))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| Decimal::try_from(f).ok())
            }
        }
        _ => None,
    };
    parsed.filter(|d| !d.is_sign_negative())
}

/// Accepts booleans and the strings "true"/"false" (case-insensitive).
fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Duration coercion: "infinite"/"Infinity" and infinite numerics become the
/// 9999 sentinel, numeric strings become integers, anything else becomes 0.
fn coerce_duration(value: &Value) -> i32 {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("infinite") || s.eq_ignore_ascii_case("infinity") {
                return UNBOUNDED_RECURRING_DURATION;
            }
            if let Ok(n) = s.parse::<i64>() {
                return clamp_duration(n);
            }
            if let Ok(f) = s.parse::<f64>() {
                if f.is_infinite() && f.is_sign_positive() {
                    return UNBOUNDED_RECURRING_DURATION;
                }
                if f.is_finite() {
                    return clamp_duration(f.trunc() as i64);
                }
            }
            warn!(value = s, "unparsable recurringDuration, defaulting to 0");
            0
        }
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                clamp_duration(int)
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                clamp_duration(f.trunc() as i64)
            } else {
                0
            }
        }
        _ => {
            warn!(value = %value, "unparsable recurringDuration, defaulting to 0");
            0
        }
    }
}

fn clamp_duration(n: i64) -> i32 {
    if n < 0 {
        warn!(value = n, "negative recurringDuration, defaulting to 0");
        0
    } else {
        n.min(i32::MAX as i64) as i32
    }
}

/// Parses a string-or-number JSON value into an integer.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Stringifies an order-number-like value (string or number).
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Trims an optional string, dropping it when empty.
fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn flag(value: &Option<Value>) -> bool {
    value.as_ref().and_then(coerce_bool).unwrap_or(false)
}

fn collect_custom_fields(contribution: &ContributionPayload) -> Vec<CustomField> {
    contribution
        .custom_fields
        .iter()
        .flatten()
        .filter_map(|field| {
            let name = clean(&field.name).or_else(|| clean(&field.label))?;
            let value = match field.value.as_ref() {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            Some(CustomField { name, value })
        })
        .collect()
}

fn collect_merchandise(contribution: &ContributionPayload) -> Vec<MerchandiseItem> {
    contribution
        .merchandise
        .iter()
        .flatten()
        .filter_map(|item| {
            let name = clean(&item.name)?;
            let quantity = item
                .quantity
                .as_ref()
                .and_then(coerce_int)
                .filter(|q| *q > 0)
                .map(|q| q.min(i32::MAX as i64) as i32)
                .unwrap_or(1);
            let amount = item.amount.as_ref().and_then(|v| {
                let parsed = coerce_decimal(v);
                if parsed.is_none() {
                    warn!(value = %v, "malformed merchandise amount, dropping");
                }
                parsed
            });
            Some(MerchandiseItem {
                name,
                quantity,
                amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(body).unwrap()
    }

    fn minimal_contribution() -> serde_json::Value {
        json!({
            "amount": "25.00",
            "createdAt": "2024-01-01T00:00:00Z",
            "isRecurring": false
        })
    }

    #[test]
    fn example_scenario_normalizes_as_specified() {
        let payload = parse(json!({
            "donor": {"email": "jane@x.com", "firstname": "Jane"},
            "contribution": minimal_contribution()
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.amount, "25.00".parse().unwrap());
        assert_eq!(event.donation.recurring_period, RecurringPeriod::Once);
        let donor = event.donor.unwrap();
        assert_eq!(donor.first_name.as_deref(), Some("Jane"));
    }

    #[test]
    fn amount_falls_back_to_first_lineitem() {
        let payload = parse(json!({
            "contribution": {"createdAt": "2024-01-01T00:00:00Z"},
            "lineitems": [{"amount": "10.50"}]
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.amount, "10.50".parse().unwrap());
    }

    #[test]
    fn amount_falls_back_to_recurring_amount() {
        let payload = parse(json!({
            "contribution": {"amount": "not a number", "createdAt": "2024-01-01T00:00:00Z"},
            "lineitems": [{"amount": "-5", "recurringAmount": 7.25}]
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.amount, "7.25".parse().unwrap());
    }

    #[test]
    fn missing_amount_everywhere_is_fatal() {
        let payload = parse(json!({
            "contribution": {"createdAt": "2024-01-01T00:00:00Z"}
        }));

        let err = normalize(&payload).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayloadStructure);
        assert_eq!(err.details.get("field"), Some(&"amount".to_string()));
    }

    #[test]
    fn negative_amount_is_not_usable() {
        let payload = parse(json!({
            "contribution": {"amount": "-25.00", "createdAt": "2024-01-01T00:00:00Z"}
        }));

        assert!(normalize(&payload).is_err());
    }

    #[test]
    fn infinite_duration_normalizes_to_sentinel() {
        assert_eq!(coerce_duration(&json!("infinite")), 9999);
        assert_eq!(coerce_duration(&json!("Infinity")), 9999);
        assert_eq!(coerce_duration(&json!("INFINITE")), 9999);
    }

    #[test]
    fn numeric_string_duration_parses() {
        assert_eq!(coerce_duration(&json!("5")), 5);
        assert_eq!(coerce_duration(&json!(12)), 12);
    }

    #[test]
    fn unparsable_duration_defaults_to_zero() {
        assert_eq!(coerce_duration(&json!("forever")), 0);
        assert_eq!(coerce_duration(&json!({"n": 1})), 0);
        assert_eq!(coerce_duration(&json!("-3")), 0);
    }

    #[test]
    fn is_recurring_accepts_string_forms() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "createdAt": "2024-01-01T00:00:00Z",
                "isRecurring": "TRUE",
                "recurringPeriod": "Monthly"
            }
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.recurring_period, RecurringPeriod::Monthly);
    }

    #[test]
    fn period_defaults_to_once_when_not_recurring() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "createdAt": "2024-01-01T00:00:00Z",
                "isRecurring": false,
                "recurringPeriod": "monthly"
            }
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.recurring_period, RecurringPeriod::Once);
    }

    #[test]
    fn unknown_period_while_recurring_defaults_to_once() {
        assert_eq!(resolve_period(true, Some("quarterly")), RecurringPeriod::Once);
        assert_eq!(resolve_period(true, Some("weekly")), RecurringPeriod::Weekly);
    }

    #[test]
    fn paid_at_prefers_lineitem_then_contribution() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "paidAt": "2024-02-01T00:00:00Z",
                "createdAt": "2024-03-01T00:00:00Z"
            },
            "lineitems": [{"paidAt": "2024-01-01T00:00:00Z"}]
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(
            event.donation.paid_at,
            Timestamp::parse_rfc3339("2024-01-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn unparsable_paid_at_candidate_falls_through() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "paidAt": "last tuesday",
                "createdAt": "2024-03-01T00:00:00Z"
            }
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(
            event.donation.paid_at,
            Timestamp::parse_rfc3339("2024-03-01T00:00:00Z").unwrap()
        );
    }

    #[test]
    fn no_usable_timestamp_is_fatal() {
        let payload = parse(json!({
            "contribution": {"amount": "5", "createdAt": "whenever"}
        }));

        let err = normalize(&payload).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayloadStructure);
        assert_eq!(err.details.get("field"), Some(&"paid_at".to_string()));
    }

    #[test]
    fn malformed_smart_boost_degrades_to_none() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "createdAt": "2024-01-01T00:00:00Z",
                "smartBoostAmount": "lots"
            }
        }));

        let event = normalize(&payload).unwrap();
        assert!(event.donation.smart_boost_amount.is_none());
    }

    #[test]
    fn order_number_accepts_numbers() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "createdAt": "2024-01-01T00:00:00Z",
                "orderNumber": 100123
            }
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.order_number.as_deref(), Some("100123"));
    }

    #[test]
    fn custom_fields_and_merchandise_are_collected() {
        let payload = parse(json!({
            "contribution": {
                "amount": "5",
                "createdAt": "2024-01-01T00:00:00Z",
                "customFields": [
                    {"name": "shirt_size", "value": "L"},
                    {"label": "referral", "value": 7},
                    {"value": "orphaned"}
                ],
                "merchandise": [
                    {"name": "Sticker pack", "quantity": 2, "amount": "5.00"},
                    {"quantity": 1}
                ]
            }
        }));

        let event = normalize(&payload).unwrap();
        assert_eq!(event.donation.custom_fields.len(), 2);
        assert_eq!(event.donation.custom_fields[1].name, "referral");
        assert_eq!(event.donation.custom_fields[1].value, "7");
        assert_eq!(event.donation.merchandise.len(), 1);
        assert_eq!(event.donation.merchandise[0].quantity, 2);
    }

    #[test]
    fn shipping_block_is_none_when_empty() {
        let payload = parse(json!({"contribution": minimal_contribution()}));
        let event = normalize(&payload).unwrap();
        assert!(event.donation.shipping.is_none());
    }

    #[test]
    fn donor_flags_coerce_from_strings() {
        let payload = parse(json!({
            "donor": {"firstname": "Jo", "isEligibleForExpressLane": "true"},
            "contribution": minimal_contribution()
        }));

        let event = normalize(&payload).unwrap();
        assert!(event.donor.unwrap().is_express_lane_eligible);
    }
}
