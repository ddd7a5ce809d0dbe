//! Sparse change sets and their application to orders.
//!
//! A [`ChangeSet`] describes which order fields a bulk operation alters. Every
//! field is optional and absence means "keep the current value". Values arrive
//! as strings (the way form inputs produce them) and are coerced when the
//! change set is applied. Blank strings count as absent.
//!
//! Application never mutates the source order: [`ChangeSet::apply`] copies the
//! order and patches the copy.
//!
//! ```rust
//! use loadboard_core::{ChangeSet, DriverDirective};
//!
//! let changes = ChangeSet {
//!     min_payout: Some("500".to_string()),
//!     drivers: DriverDirective::from_ids(Some(vec!["d-1".into(), "d-2".into()])),
//!     ..ChangeSet::default()
//! };
//! assert!(!changes.is_empty());
//! assert_eq!(changes.field_count(), 2);
//! ```

use jiff::{civil::DateTime, tz::TimeZone, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{LoadboardError, Result},
    models::{Order, MAX_DRIVERS},
};

/// What to do with an order's assigned drivers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DriverDirective {
    /// Leave the drivers as they are
    #[default]
    Keep,

    /// Remove every assigned driver
    Clear,

    /// Replace the drivers with these (at most two)
    Assign(Vec<String>),
}

impl DriverDirective {
    /// Builds a directive from the wire form. Ids are trimmed and blanks
    /// dropped; the first [`MAX_DRIVERS`] that remain are assigned. `null` or
    /// a list with no real ids clears.
    pub fn from_ids(ids: Option<Vec<String>>) -> Self {
        let ids: Vec<String> = ids
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .take(MAX_DRIVERS)
            .collect();
        if ids.is_empty() {
            DriverDirective::Clear
        } else {
            DriverDirective::Assign(ids)
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, DriverDirective::Keep)
    }
}

mod driver_directive {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::DriverDirective;

    pub(super) fn serialize<S: Serializer>(
        directive: &DriverDirective,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match directive {
            DriverDirective::Assign(ids) => ids.serialize(serializer),
            DriverDirective::Keep | DriverDirective::Clear => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DriverDirective, D::Error> {
        Option::<Vec<String>>::deserialize(deserializer).map(DriverDirective::from_ids)
    }
}

/// Sparse patch describing one user-initiated bulk operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    /// New window start, `YYYY-MM-DD HH:mm` in the user's zone or RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<String>,

    /// New window end, same formats as the start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_payout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price_per_mile: Option<String>,

    /// Minimum pickup buffer in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stops: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_radius: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_radius: Option<String>,

    #[serde(
        default,
        rename = "selectedDriverIds",
        skip_serializing_if = "DriverDirective::is_keep",
        with = "driver_directive"
    )]
    pub drivers: DriverDirective,
}

/// A field's value, or `None` when it is blank or `"none"`.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
}

fn parse_amount(field: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadboardError::invalid_input(field).with_reason(format!("'{raw}' is not a number")))
}

fn parse_count(field: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>().map_err(|_| {
        LoadboardError::invalid_input(field)
            .with_reason(format!("'{raw}' is not a whole non-negative number"))
    })
}

/// Coerces a form date into a timestamp. RFC 3339 input is taken as-is; a
/// civil date-time is interpreted in `tz`.
fn parse_time(field: &str, raw: &str, tz: &TimeZone) -> Result<Timestamp> {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Ok(ts);
    }
    let civil = raw
        .parse::<DateTime>()
        .or_else(|_| DateTime::strptime("%Y-%m-%d %H:%M", raw))
        .map_err(|e| LoadboardError::invalid_input(field).with_reason(e.to_string()))?;
    civil
        .to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp())
        .map_err(|e| LoadboardError::invalid_input(field).with_reason(e.to_string()))
}

impl ChangeSet {
    /// Number of fields this change set alters.
    pub fn field_count(&self) -> usize {
        let strings = [
            &self.start_date_time,
            &self.end_date_time,
            &self.min_payout,
            &self.min_price_per_mile,
            &self.stem_time,
            &self.max_stops,
            &self.origin_radius,
            &self.destination_radius,
        ];
        strings.iter().filter(|v| present(v).is_some()).count()
            + usize::from(!self.drivers.is_keep())
    }

    /// True when applying this change set would leave an order untouched.
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Derives the patched copy of `order`. Civil date-times are read in `tz`.
    ///
    /// # Errors
    ///
    /// Returns `LoadboardError::InvalidInput` naming the first field whose
    /// value cannot be coerced.
    pub fn apply(&self, order: &Order, tz: &TimeZone) -> Result<Order> {
        let mut derived = order.clone();

        if let Some(raw) = present(&self.start_date_time) {
            derived.start_time = parse_time("startDateTime", raw, tz)?;
        }
        if let Some(raw) = present(&self.end_date_time) {
            derived.end_time = parse_time("endDateTime", raw, tz)?;
        }
        if let Some(raw) = present(&self.min_payout) {
            derived.total_cost.value = parse_amount("minPayout", raw)?;
        }
        if let Some(raw) = present(&self.min_price_per_mile) {
            derived.cost_per_distance.value = parse_amount("minPricePerMile", raw)?;
        }
        if let Some(raw) = present(&self.stem_time) {
            derived.min_pick_up_buffer_in_minutes = parse_count("stemTime", raw)?;
        }
        if let Some(raw) = present(&self.max_stops) {
            derived.max_number_of_stops = parse_count("maxStops", raw)?;
        }
        if let Some(raw) = present(&self.origin_radius) {
            derived.origin_city_radius.value = parse_amount("originRadius", raw)?;
        }
        if let Some(raw) = present(&self.destination_radius) {
            derived.destination_city_radius.value = parse_amount("destinationRadius", raw)?;
        }

        match &self.drivers {
            DriverDirective::Keep => {}
            DriverDirective::Clear => derived.clear_drivers(),
            DriverDirective::Assign(ids) => derived.assign_drivers(ids),
        }

        Ok(derived)
    }

    /// Applies the change set and strips the identity fields, producing the
    /// body that posts a new order copied from `order`.
    pub fn clone_payload(&self, order: &Order, tz: &TimeZone) -> Result<Value> {
        let derived = self.apply(order, tz)?;
        Ok(derived.to_new_order_payload()?)
    }
}
