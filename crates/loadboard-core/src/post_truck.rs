//! Posting a truck against a work opportunity.
//!
//! The form on a work opportunity carries only a few values; everything else
//! in the new order comes from the opportunity itself or from the host
//! region's defaults.

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::{
    error::{LoadboardError, Result},
    models::{Distance, DriverType, Money, Order, Rate, WorkOpportunity},
    params::PostTruck,
    region::DomainInfo,
};

/// Pickup buffer used when the form leaves stem time unset.
pub const DEFAULT_STEM_TIME_MINUTES: u32 = 60;
/// Stops allowed on a posted truck.
pub const DEFAULT_MAX_STOPS: u32 = 1;
/// Origin and destination radius, in the region's distance unit.
pub const DEFAULT_RADIUS: f64 = 25.0;

fn optional_amount(field: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(Some)
        .ok_or_else(|| {
            LoadboardError::invalid_input(field).with_reason(format!("'{raw}' is not an amount"))
        })
}

fn stem_time(raw: Option<&str>) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_STEM_TIME_MINUTES),
        Some(raw) if raw.eq_ignore_ascii_case("none") => Ok(DEFAULT_STEM_TIME_MINUTES),
        Some(raw) => raw.parse::<u32>().map_err(|_| {
            LoadboardError::invalid_input("stemTime")
                .with_reason(format!("'{raw}' is not a number of minutes"))
        }),
    }
}

fn window(opportunity: &WorkOpportunity) -> Result<(Timestamp, Timestamp)> {
    let missing = |field: &str| {
        LoadboardError::invalid_input(field).with_reason(format!(
            "Work opportunity {} has no {field}",
            opportunity.id
        ))
    };
    let start = opportunity
        .first_pickup_time
        .ok_or_else(|| missing("firstPickupTime"))?;
    let end = opportunity
        .last_delivery_time
        .ok_or_else(|| missing("lastDeliveryTime"))?;
    Ok((start, end))
}

/// Builds the order a posted truck creates. The result carries no identity
/// fields, so the upsert endpoint creates a new order.
///
/// # Errors
///
/// Returns `LoadboardError::InvalidInput` when a form value cannot be read or
/// the opportunity has no time window.
pub fn new_order_payload(
    opportunity: &WorkOpportunity,
    form: &PostTruck,
    domain: DomainInfo,
) -> Result<Value> {
    let (start_time, end_time) = window(opportunity)?;
    let currency = domain.region.currency().to_string();
    let unit = domain.unit.as_wire().to_string();

    let payout = match optional_amount("minPayout", form.min_payout.as_deref())? {
        Some(value) => Money {
            value,
            unit: currency.clone(),
        },
        None => opportunity.payout.clone().unwrap_or(Money {
            value: 0.0,
            unit: currency.clone(),
        }),
    };
    let rate = optional_amount("minPricePerDistance", form.min_price_per_distance.as_deref())?
        .unwrap_or(0.0);
    let radius = Distance {
        value: DEFAULT_RADIUS,
        unit: unit.clone(),
    };

    let mut order = Order {
        id: String::new(),
        version: 0,
        alias: String::new(),
        status: None,
        match_type: None,
        start_time,
        end_time,
        total_cost: payout,
        cost_per_distance: Rate {
            value: rate,
            currency_unit: currency,
            distance_unit: unit,
        },
        min_pick_up_buffer_in_minutes: stem_time(form.stem_time.as_deref())?,
        max_number_of_stops: DEFAULT_MAX_STOPS,
        origin_city_radius: radius.clone(),
        destination_city_radius: radius,
        driver_types: vec![DriverType::Solo],
        supply_transient_driver_id_list: Vec::new(),
        extra: Map::new(),
    };
    order.assign_drivers(&form.drivers());

    Ok(order.to_new_order_payload()?)
}
