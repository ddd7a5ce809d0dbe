//! Order model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DriverType;

/// Maximum number of drivers that can be assigned to a single order.
pub const MAX_DRIVERS: usize = 2;

/// Keys that identify an existing order on the host. Removed from a payload
/// when the host should treat it as a brand new order.
pub const IDENTITY_KEYS: [&str; 5] = ["id", "status", "version", "alias", "matchType"];

/// A monetary amount with its currency unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub value: f64,
    pub unit: String,
}

/// A price per distance unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    pub value: f64,
    pub currency_unit: String,
    pub distance_unit: String,
}

/// A distance with its unit, used for search radii.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: String,
}

/// A truck capacity order currently posted on the loadboard.
///
/// Fields the host sends that are not modelled here are kept in `extra` so
/// that an upsert sends them back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Stable identifier assigned by the host
    pub id: String,

    /// Optimistic-concurrency version; stale versions are rejected remotely
    pub version: u64,

    /// Human-facing alias
    #[serde(default)]
    pub alias: String,

    /// Lifecycle status reported by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Match type reported by the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,

    /// Start of the availability window
    pub start_time: Timestamp,

    /// End of the availability window
    pub end_time: Timestamp,

    /// Minimum payout for a matched load
    pub total_cost: Money,

    /// Minimum rate per distance unit
    pub cost_per_distance: Rate,

    /// Minimum pickup buffer ("stem time") in minutes
    pub min_pick_up_buffer_in_minutes: u32,

    /// Maximum number of stops
    pub max_number_of_stops: u32,

    /// Search radius around the origin city
    pub origin_city_radius: Distance,

    /// Search radius around the destination city
    pub destination_city_radius: Distance,

    /// SOLO or TEAM classification
    #[serde(default)]
    pub driver_types: Vec<DriverType>,

    /// Assigned driver identifiers
    #[serde(default)]
    pub supply_transient_driver_id_list: Vec<String>,

    /// Host fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The identity of an order as needed by the cancel endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRef {
    pub id: String,
    pub version: u64,
}

impl Order {
    /// Returns the id + version pair used to cancel this order.
    pub fn reference(&self) -> OrderRef {
        OrderRef {
            id: self.id.clone(),
            version: self.version,
        }
    }

    /// Replaces the assigned drivers, keeping at most [`MAX_DRIVERS`], and
    /// keeps `driver_types` consistent with the new count.
    pub fn assign_drivers(&mut self, driver_ids: &[String]) {
        self.supply_transient_driver_id_list =
            driver_ids.iter().take(MAX_DRIVERS).cloned().collect();
        self.driver_types = vec![DriverType::for_driver_count(
            self.supply_transient_driver_id_list.len(),
        )];
    }

    /// Removes every assigned driver.
    pub fn clear_drivers(&mut self) {
        self.assign_drivers(&[]);
    }

    /// Serializes the order without its identity fields so the host creates a
    /// new order instead of updating this one.
    pub fn to_new_order_payload(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = value {
            for key in IDENTITY_KEYS {
                map.remove(key);
            }
        }
        Ok(value)
    }
}
