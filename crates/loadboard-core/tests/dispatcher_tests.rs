mod common;

use std::time::Duration;

use common::{create_test_loadboard, orders_body, seed_orders, TOKEN};
use loadboard_core::{BatchRequest, OrderAction, OrderEvent, PostTruck};
use serde_json::json;
use tokio::{sync::broadcast, time::timeout};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

async fn next_terminal(events: &mut broadcast::Receiver<OrderEvent>) -> OrderEvent {
    timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if event.is_terminal() => return event,
                Ok(_) => {}
                Err(e) => panic!("Event channel failed: {e}"),
            }
        }
    })
    .await
    .expect("No terminal event within 5s")
}

#[tokio::test]
async fn test_dispatcher_runs_submitted_request() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/batch/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/loadboard/orders/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body(1)))
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/drivers/basic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "workOpportunities": [] })))
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    seed_orders(&loadboard, 3).await;
    let dispatcher = loadboard.spawn_dispatcher();
    let mut events = loadboard.notifier().subscribe();

    let orders = loadboard.orders().await.unwrap();
    loadboard
        .submit(BatchRequest::new(OrderAction::Delete, orders))
        .unwrap();

    match next_terminal(&mut events).await {
        OrderEvent::Success { action, progress } => {
            assert_eq!(action, OrderAction::Delete);
            assert_eq!((progress.completed, progress.failed, progress.total), (3, 0, 3));
            assert!(progress.is_complete);
        }
        other => panic!("Expected success, got {other:?}"),
    }

    // The refresh that follows success replaces the mirror with the host's
    // listing.
    timeout(Duration::from_secs(5), async {
        while loadboard.orders().await.unwrap().len() != 1 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("Mirror was not refreshed");

    dispatcher.abort();
}

#[tokio::test]
async fn test_dispatcher_reports_failed_batch_as_error_event() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/upsert"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    seed_orders(&loadboard, 2).await;
    let dispatcher = loadboard.spawn_dispatcher();
    let mut events = loadboard.notifier().subscribe();

    let orders = loadboard.orders().await.unwrap();
    loadboard
        .submit(BatchRequest::new(OrderAction::Clone, orders).with_changes(Default::default()))
        .unwrap();

    match next_terminal(&mut events).await {
        OrderEvent::Error { action, error } => {
            assert_eq!(action, OrderAction::Clone);
            assert_eq!(error, "Failed to clone 2 orders");
        }
        other => panic!("Expected error, got {other:?}"),
    }
    dispatcher.abort();
}

#[tokio::test]
async fn test_post_truck_upserts_new_order() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/upsert"))
        .and(matchers::body_partial_json(json!({
            "startTime": "2025-05-01T10:00:00Z",
            "totalCost": { "value": 650.0, "unit": "USD" },
            "maxNumberOfStops": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "new-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    loadboard
        .ingest(
            "/api/loadboard/search",
            json!({
                "workOpportunities": [{
                    "id": "wo-7",
                    "firstPickupTime": "2025-05-01T10:00:00Z",
                    "lastDeliveryTime": "2025-05-01T22:00:00Z",
                    "payout": { "value": 650.0, "unit": "USD" }
                }]
            }),
        )
        .await
        .unwrap();

    let response = loadboard
        .post_truck(&PostTruck {
            work_opportunity_id: "wo-7".to_string(),
            ..PostTruck::default()
        })
        .await
        .unwrap();
    assert_eq!(response["id"], "new-1");
}

#[tokio::test]
async fn test_overlapping_request_is_rejected_without_terminal_event() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/batch/cancel"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    seed_orders(&loadboard, 2).await;
    let dispatcher = loadboard.spawn_dispatcher();
    let mut events = loadboard.notifier().subscribe();

    let orders = loadboard.orders().await.unwrap();
    for order in orders {
        loadboard
            .submit(BatchRequest::new(OrderAction::Delete, vec![order]))
            .unwrap();
    }

    let mut seen = Vec::new();
    timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("Event channel failed");
            let terminal = event.is_terminal();
            seen.push(event);
            if terminal {
                break;
            }
        }
    })
    .await
    .expect("No terminal event within 5s");

    // Anything still in flight would show up well inside this window.
    tokio::time::sleep(Duration::from_millis(700)).await;
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    let terminal: Vec<&OrderEvent> = seen.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1, "events: {seen:?}");
    assert!(matches!(terminal[0], OrderEvent::Success { .. }));

    let rejected: Vec<&str> = seen
        .iter()
        .filter_map(|event| match event {
            OrderEvent::Rejected { error, .. } => Some(error.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(rejected.len(), 1);
    assert!(rejected[0].contains("already in progress"));

    dispatcher.abort();
}
