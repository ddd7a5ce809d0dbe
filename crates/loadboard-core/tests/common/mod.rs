#![allow(dead_code)]

use std::time::Duration;

use jiff::tz::TimeZone;
use loadboard_core::{Loadboard, LoadboardBuilder};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

/// Order JSON as the host returns it.
pub fn order_json(id: &str, version: u64) -> Value {
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

/// The orders endpoint body for `count` orders named `o-0`, `o-1`, ...
pub fn orders_body(count: usize) -> Value {
    let orders: Vec<Value> = (0..count).map(|i| order_json(&format!("o-{i}"), 1)).collect();
    json!({ "truckCapacityOrders": orders })
}

/// Helper function to create a loadboard against a mock host, with no delays.
pub async fn create_test_loadboard(
    server: &MockServer,
    token: Option<&str>,
) -> (TempDir, Loadboard) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let loadboard = LoadboardBuilder::new()
        .with_base_url(Some(server.uri()))
        .with_csrf_token(token.map(str::to_string))
        .with_database_path(Some(temp_dir.path().join("mirror.db")))
        .with_step_delay(Duration::ZERO)
        .with_refresh_delay(Duration::ZERO)
        .with_time_zone(TimeZone::UTC)
        .build()
        .await
        .expect("Failed to create loadboard");
    (temp_dir, loadboard)
}

/// Puts `count` orders into the mirror the way a captured response would.
pub async fn seed_orders(loadboard: &Loadboard, count: usize) {
    loadboard
        .ingest("/api/loadboard/orders/get", orders_body(count))
        .await
        .expect("Failed to seed orders");
}
