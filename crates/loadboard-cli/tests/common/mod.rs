#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const ORDERS_URL: &str = "https://relay.amazon.com/api/loadboard/orders/get";

/// Helper function to create a temporary directory for CLI tests
pub fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// `lb --no-color --database-file <dir>/mirror.db`, with host settings taken
/// from the arguments only.
pub fn lb_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lb").expect("Failed to find lb binary");
    cmd.env_remove("LOADBOARD_BASE_URL")
        .env_remove("LOADBOARD_CSRF_TOKEN")
        .env_remove("LOADBOARD_COOKIE")
        .env("TZ", "UTC")
        .arg("--no-color")
        .arg("--database-file")
        .arg(db_path(dir));
    cmd
}

pub fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("mirror.db")
}

pub fn order_json(id: &str, version: u64) -> Value {
    json!({
        "id": id,
        "version": version,
        "alias": format!("ALIAS-{id}"),
        "status": "ACTIVE",
        "startTime": "2025-03-01T08:00:00Z",
        "endTime": "2025-03-01T20:00:00Z",
        "totalCost": { "value": 400.0, "unit": "USD" },
        "costPerDistance": { "value": 2.5, "currencyUnit": "USD", "distanceUnit": "MILES" },
        "minPickUpBufferInMinutes": 60,
        "maxNumberOfStops": 3,
        "originCityRadius": { "value": 25.0, "unit": "MILES" },
        "destinationCityRadius": { "value": 50.0, "unit": "MILES" },
        "driverTypes": ["SOLO"],
        "supplyTransientDriverIdList": ["driver-1"]
    })
}

/// Writes `body` to a file in `dir` and returns its path.
pub fn write_json(dir: &Path, name: &str, body: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body.to_string()).expect("Failed to write fixture");
    path
}

/// Mirrors orders `o-1..=o-count` through `lb ingest`.
pub fn ingest_orders(dir: &TempDir, count: usize) {
    let orders: Vec<Value> = (1..=count)
        .map(|i| order_json(&format!("o-{i}"), 1))
        .collect();
    let file = write_json(
        dir.path(),
        "orders.json",
        &json!({ "truckCapacityOrders": orders }),
    );
    lb_cmd(dir)
        .arg("ingest")
        .arg(ORDERS_URL)
        .arg(file)
        .assert()
        .success();
}
