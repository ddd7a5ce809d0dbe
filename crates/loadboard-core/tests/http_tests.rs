mod common;

use std::sync::Arc;

use common::{create_test_loadboard, order_json, orders_body, seed_orders, TOKEN};
use loadboard_core::{
    BatchRequest, ChangeSet, HttpRecordStore, LoadboardError, OrderAction, OrderEvent, OrderRef,
    PageToken, RecordStore, StaticToken, TokenSource,
};
use reqwest::Url;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer, token: Arc<dyn TokenSource>) -> HttpRecordStore {
    HttpRecordStore::new(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        token,
        Some("session=abc".to_string()),
    )
}

fn static_token(token: Option<&str>) -> Arc<dyn TokenSource> {
    Arc::new(StaticToken::new(token.map(str::to_string)))
}

#[tokio::test]
async fn test_cancel_order_sends_token_cookie_and_reason() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/cancel/o-1/7"))
        .and(matchers::header("x-csrf-token", TOKEN))
        .and(matchers::header("cookie", "session=abc"))
        .and(matchers::body_json(json!({
            "cancellationReason": "FOUND_OTHER_WORK",
            "cancellationComment": ""
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    store
        .cancel_order(&OrderRef {
            id: "o-1".to_string(),
            version: 7,
        })
        .await
        .expect("cancel with an empty 200 body should succeed");
}

#[tokio::test]
async fn test_cancel_order_encodes_reserved_characters_in_id() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/cancel/a%2Fb%3Fc%23d/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    store
        .cancel_order(&OrderRef {
            id: "a/b?c#d".to_string(),
            version: 7,
        })
        .await
        .expect("cancel should reach the encoded path");
}

#[tokio::test]
async fn test_batch_cancel_body_lists_every_order() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/batch/cancel"))
        .and(matchers::body_json(json!({
            "orders": [{ "id": "a", "version": 1 }, { "id": "b", "version": 2 }],
            "cancellationReason": "FOUND_OTHER_WORK",
            "cancellationComment": ""
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    let refs = vec![
        OrderRef {
            id: "a".to_string(),
            version: 1,
        },
        OrderRef {
            id: "b".to_string(),
            version: 2,
        },
    ];
    store.cancel_orders(&refs).await.unwrap();
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(None));
    let result = store.upsert_order(&json!({ "id": "o-1" })).await;
    assert!(matches!(result, Err(LoadboardError::MissingToken)));
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/upsert"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "stale" })))
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    match store.upsert_order(&json!({})).await {
        Err(LoadboardError::Http { status, url }) => {
            assert_eq!(status, 409);
            assert!(url.ends_with("/api/loadboard/orders/upsert"));
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upsert_requires_json_body() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    assert!(matches!(
        store.upsert_order(&json!({})).await,
        Err(LoadboardError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn test_reads_unwrap_host_envelopes() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/loadboard/orders/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body(2)))
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/drivers/basic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "firstName": "A", "lastName": "B", "latestTransientDriverId": "t-1", "status": "active" },
                { "firstName": "C", "lastName": "D", "latestTransientDriverId": "t-2", "status": "inactive" }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workOpportunities": [{ "id": "wo-1" }]
        })))
        .mount(&server)
        .await;

    let store = store_for(&server, static_token(Some(TOKEN)));
    assert_eq!(store.fetch_orders().await.unwrap().len(), 2);
    assert_eq!(store.fetch_drivers().await.unwrap().len(), 2);
    assert_eq!(store.search_work_opportunities().await.unwrap()[0].id, "wo-1");
}

#[tokio::test]
async fn test_page_token_is_read_from_meta_tag() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/loadboard/orders"))
        .and(matchers::header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><meta name="x-csrf-token" content="from-page"></head></html>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let page = Url::parse(&server.uri())
        .unwrap()
        .join("/loadboard/orders?state=active")
        .unwrap();
    let source = PageToken::new(reqwest::Client::new(), page, Some("session=abc".to_string()));

    // Read afresh on every call.
    assert_eq!(source.token().await.as_deref(), Some("from-page"));
    assert_eq!(source.token().await.as_deref(), Some("from-page"));
}

#[tokio::test]
async fn test_unreachable_page_yields_no_token() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let page = Url::parse(&server.uri()).unwrap();
    let source = PageToken::new(reqwest::Client::new(), page, None);
    assert_eq!(source.token().await, None);
}

#[tokio::test]
async fn test_delete_twenty_five_orders_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/batch/cancel"))
        .and(matchers::header("x-csrf-token", TOKEN))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/loadboard/orders/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(orders_body(0)))
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    seed_orders(&loadboard, 25).await;
    let mut events = loadboard.notifier().subscribe();

    let orders = loadboard.orders().await.unwrap();
    let outcome = loadboard
        .run(&BatchRequest::new(OrderAction::Delete, orders))
        .await
        .unwrap();

    assert_eq!(outcome.progress.completed, 25);
    let mut progress_count = 0;
    let mut terminal = None;
    while let Ok(event) = events.try_recv() {
        match event {
            OrderEvent::Progress { .. } => progress_count += 1,
            other if other.is_terminal() => terminal = Some(other),
            _ => {}
        }
    }
    assert_eq!(progress_count, 3);
    assert!(matches!(terminal, Some(OrderEvent::Success { progress, .. }) if progress.completed == 25));

    // Cancelled orders leave the mirror even though the drivers and search
    // reads of the refresh are not served.
    assert!(loadboard.orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_no_token_fails_record_without_network_calls() {
    let server = MockServer::start().await;
    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, None).await;
    seed_orders(&loadboard, 1).await;
    let mut events = loadboard.notifier().subscribe();

    let orders = loadboard.orders().await.unwrap();
    let changes = ChangeSet {
        max_stops: Some("2".to_string()),
        ..ChangeSet::default()
    };
    let outcome = loadboard
        .run(&BatchRequest::new(OrderAction::Modify, orders).with_changes(changes))
        .await
        .unwrap();

    assert_eq!(outcome.progress.failed, 1);
    assert_eq!(outcome.failed_ids, vec!["o-0"]);
    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    match last {
        Some(OrderEvent::Error { error, .. }) => assert_eq!(error, "Failed to modify 1 order"),
        other => panic!("Expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn test_modify_sends_patched_order_with_identity() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/loadboard/orders/upsert"))
        .and(matchers::body_partial_json(json!({
            "id": "o-0",
            "version": 1,
            "maxNumberOfStops": 5,
            "equipmentType": "FIFTY_THREE_FOOT_TRUCK"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("o-0", 2)))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, loadboard) = create_test_loadboard(&server, Some(TOKEN)).await;
    seed_orders(&loadboard, 1).await;
    let orders = loadboard.orders().await.unwrap();
    let changes = ChangeSet {
        max_stops: Some("5".to_string()),
        ..ChangeSet::default()
    };
    let outcome = loadboard
        .run(&BatchRequest::new(OrderAction::Modify, orders).with_changes(changes))
        .await
        .unwrap();
    assert!(outcome.succeeded());
}
