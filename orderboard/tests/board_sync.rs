//! OrderBoard behaviour against a scripted HTTP client on a paused clock

use std::time::Duration;

use orderboard::{
    ApiError, BoardState, ConnectionStatus, DashboardConfig, OrderBoard, OrderBoardError,
    OrderStatus, PollConfig,
};
use sync_transport::testing::ScriptedHttpClient;
use sync_transport::{HttpResponse, Method, TransportError};
use tokio::sync::watch;

fn order_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "customer_name": "Ada",
        "customer_phone": "555-0100",
        "delivery_address": "1 Loop Rd",
        "total_amount": "12.00",
        "status": status,
        "created_at": "2024-05-01T12:30:00Z",
        "updated_at": "2024-05-01T12:30:00Z",
        "items": [{"name": "Pho", "quantity": 1, "price": "12.00"}]
    })
}

fn list_response(orders: &[(&str, &str)], etag: &str) -> HttpResponse {
    let body: Vec<_> = orders
        .iter()
        .map(|(id, status)| order_json(id, status))
        .collect();
    HttpResponse::new(200)
        .with_header("ETag", etag)
        .with_body(serde_json::to_vec(&body).unwrap())
}

fn scripted() -> ScriptedHttpClient {
    let client = ScriptedHttpClient::new();
    client.set_fallback(HttpResponse::new(304));
    client
}

fn connect(client: &ScriptedHttpClient) -> OrderBoard<ScriptedHttpClient> {
    OrderBoard::with_client(DashboardConfig::default(), client.clone())
        .expect("Failed to connect board")
}

async fn wait_for_polls(rx: &mut watch::Receiver<BoardState>, polls: u64) -> BoardState {
    let state = tokio::time::timeout(
        Duration::from_secs(600),
        rx.wait_for(|state| state.poll_count >= polls),
    )
    .await
    .expect("Timed out waiting for polls")
    .expect("Board dropped");
    state.clone()
}

#[tokio::test(start_paused = true)]
async fn test_initial_fetch_populates_board() {
    let client = scripted();
    client.push_response(list_response(
        &[("ORD-1-101", "pending"), ("ORD-2-202", "ready")],
        "\"v1\"",
    ));
    let board = connect(&client);
    assert!(board.is_loading());
    assert!(board.orders().is_empty());

    let mut rx = board.subscribe();
    wait_for_polls(&mut rx, 1).await;

    assert!(!board.is_loading());
    assert_eq!(board.status(), ConnectionStatus::Connected);
    assert_eq!(board.orders().len(), 2);
    assert_eq!(board.orders_with_status(&OrderStatus::Ready).len(), 1);
    assert_eq!(
        board.find_order("ORD-1-101").map(|order| order.status),
        Some(OrderStatus::Pending)
    );
    assert_eq!(board.find_order("ORD-9-999"), None);
}

#[tokio::test(start_paused = true)]
async fn test_update_status_patches_then_refreshes() {
    let client = scripted();
    client.push_response(list_response(&[("ORD-1-101", "pending")], "\"v1\""));
    let board = connect(&client);
    let mut rx = board.subscribe();
    wait_for_polls(&mut rx, 1).await;

    client.push_response(
        HttpResponse::new(200)
            .with_body(serde_json::to_vec(&order_json("ORD-1-101", "accepted")).unwrap()),
    );
    client.push_response(list_response(&[("ORD-1-101", "accepted")], "\"v2\""));

    let updated = board
        .update_status("ORD-1-101", OrderStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Accepted);
    assert_eq!(board.current_interval(), Duration::from_millis(2000));

    let state = wait_for_polls(&mut rx, 2).await;

    assert_eq!(state.status, ConnectionStatus::Connected);
    assert_eq!(board.orders()[0].status, OrderStatus::Accepted);

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].method, Method::Patch);
    assert_eq!(
        requests[1].url,
        "http://localhost:8000/api/orders/ORD-1-101/"
    );
    assert_eq!(requests[2].method, Method::Get);
    assert_eq!(requests[2].header_value("If-None-Match"), Some("\"v1\""));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_update_does_not_refresh() {
    let client = scripted();
    client.push_response(list_response(&[("ORD-1-101", "pending")], "\"v1\""));
    let board = connect(&client);
    let mut rx = board.subscribe();
    wait_for_polls(&mut rx, 1).await;

    client.push_response(HttpResponse::new(404).with_body("{\"detail\":\"Not found.\"}"));

    let error = board
        .update_status("ORD-0-000", OrderStatus::Ready)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        OrderBoardError::Api(ApiError::Status { status: 404, .. })
    ));

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(client.request_count(), 2);
    assert_eq!(board.state().poll_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failures_keep_last_orders_visible() {
    let client = scripted();
    client.push_response(list_response(&[("ORD-1-101", "pending")], "\"v1\""));
    client.push_error(TransportError::Network("connection refused".to_string()));
    let board = connect(&client);
    let mut rx = board.subscribe();

    let state = wait_for_polls(&mut rx, 2).await;

    assert_eq!(state.status, ConnectionStatus::Error);
    assert_eq!(board.orders().len(), 1);
    assert!(board
        .last_error()
        .is_some_and(|error| error.contains("connection refused")));

    // Next poll hits the 304 fallback
    let state = wait_for_polls(&mut rx, 3).await;
    assert_eq!(state.status, ConnectionStatus::Polling);
    assert_eq!(state.last_error, None);
    assert_eq!(board.orders().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_and_stop() {
    let client = scripted();
    client.push_response(list_response(&[], "\"v1\""));
    let board = connect(&client);
    let mut rx = board.subscribe();
    wait_for_polls(&mut rx, 3).await;
    assert_eq!(board.current_interval(), Duration::from_millis(4500));

    board.refresh();
    assert_eq!(board.current_interval(), Duration::from_millis(2000));
    wait_for_polls(&mut rx, 4).await;

    board.stop();
    let requests = client.request_count();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(client.request_count(), requests);

    board.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_never_polls() {
    let client = scripted();
    let config = DashboardConfig::default().with_poll_config(
        PollConfig::default().with_intervals(Duration::from_secs(10), Duration::from_secs(1)),
    );

    let result = OrderBoard::with_client(config, client.clone());

    assert!(matches!(result, Err(OrderBoardError::Config(_))));
    assert_eq!(client.request_count(), 0);
}
