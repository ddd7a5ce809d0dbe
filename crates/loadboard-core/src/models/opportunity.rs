//! Work opportunity model: a load offered on the board.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Distance, Money};

/// A read-only candidate load. Never mutated; only used as the source of a
/// new order when posting a truck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkOpportunity {
    pub id: String,

    #[serde(default)]
    pub first_pickup_time: Option<Timestamp>,

    #[serde(default)]
    pub last_delivery_time: Option<Timestamp>,

    #[serde(default)]
    pub payout: Option<Money>,

    #[serde(default)]
    pub total_distance: Option<Distance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
