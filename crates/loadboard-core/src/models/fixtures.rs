//! Shared order fixtures for unit tests.

use serde_json::json;

use super::Order;

/// JSON for an order as the host returns it, including a field the models do
/// not know about.
pub(crate) fn order_json(id: &str, version: u64) -> serde_json::Value {
    json!({
        "id": id,
        "version": version,
        "alias": format!("ALIAS-{id}"),
        "status": "ACTIVE",
        "matchType": "EXACT",
        "startTime": "2025-03-01T08:00:00Z",
        "endTime": "2025-03-01T20:00:00Z",
        "totalCost": { "value": 400.0, "unit": "USD" },
        "costPerDistance": { "value": 2.5, "currencyUnit": "USD", "distanceUnit": "MILES" },
        "minPickUpBufferInMinutes": 60,
        "maxNumberOfStops": 3,
        "originCityRadius": { "value": 25.0, "unit": "MILES" },
        "destinationCityRadius": { "value": 50.0, "unit": "MILES" },
        "driverTypes": ["SOLO"],
        "supplyTransientDriverIdList": ["driver-1"],
        "equipmentType": "FIFTY_THREE_FOOT_TRUCK"
    })
}

pub(crate) fn sample_order(id: &str) -> Order {
    serde_json::from_value(order_json(id, 7)).expect("fixture order should deserialize")
}
