mod common;

use common::order_id;
use httpmock::prelude::*;
use pay_watch::adapters::rest::{CheckoutRequest, StoreApi};
use pay_watch::domain::error::StoreError;
use pay_watch::domain::order::OrderStatus;
use serde_json::json;

fn api_for(server: &MockServer) -> StoreApi {
    StoreApi::new(server.base_url(), Some("tok_123".into())).unwrap()
}

// ── 1. request decoration and order parsing ────────────────────────────────

#[tokio::test]
async fn get_order_sends_auth_and_correlation_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/orders/ord_1")
                .header("Authorization", "Bearer tok_123")
                .header("Accept", "application/json")
                .header_exists("X-Correlation-Id");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "id": "ord_1",
                    "status": "paid",
                    "totalAmount": 59.98,
                    "items": [
                        {"id": "li_1", "productId": "prod_1", "quantity": 2, "unitPrice": 29.99}
                    ],
                    "createdAt": "2026-08-04T12:00:00Z"
                }));
        })
        .await;

    let order = api_for(&server).get_order(&order_id("ord_1")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(order.id, "ord_1");
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.total_amount, 59.98);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_id, "prod_1");
    assert!(order.created_at.is_some());
}

// ── 2. error taxonomy mapping ──────────────────────────────────────────────

#[tokio::test]
async fn missing_order_maps_to_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/orders/ord_gone");
            then.status(404)
                .header("Content-Type", "application/problem+json")
                .json_body(json!({"title": "Not Found", "detail": "no such order"}));
        })
        .await;

    let err = api_for(&server)
        .get_order(&order_id("ord_gone"))
        .await
        .unwrap_err();

    match err {
        StoreError::NotFound(msg) => assert!(msg.contains("no such order")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn expired_session_maps_to_unauthorized() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/orders/ord_1");
            then.status(401)
                .header("Content-Type", "application/problem+json")
                .json_body(json!({"title": "Unauthorized"}));
        })
        .await;

    let err = api_for(&server)
        .get_order(&order_id("ord_1"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Unauthorized));
}

#[tokio::test]
async fn field_errors_map_to_validation() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/orders");
            then.status(400)
                .header("Content-Type", "application/problem+json")
                .json_body(json!({
                    "title": "One or more validation errors occurred.",
                    "errors": {"paymentMethod": ["unsupported payment method"]}
                }));
        })
        .await;

    let err = api_for(&server)
        .create_order(&CheckoutRequest {
            payment_method: "carrier-pigeon".into(),
        })
        .await
        .unwrap_err();

    match err {
        StoreError::Validation(msg) => assert!(msg.contains("paymentMethod")),
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_problem() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/orders/ord_1");
            then.status(500).body("boom");
        })
        .await;

    let err = api_for(&server)
        .get_order(&order_id("ord_1"))
        .await
        .unwrap_err();

    match err {
        StoreError::Problem(msg) => assert!(msg.contains("boom")),
        other => panic!("expected Problem, got {other:?}"),
    }
}

// ── 3. checkout ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_order_returns_the_gateway_envelope() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/orders")
                .json_body(json!({"paymentMethod": "vnpay"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "order": {"id": "ord_9", "status": "pending"},
                    "payment": {"checkoutUrl": "https://gateway.example/pay/123"}
                }));
        })
        .await;

    let reply = api_for(&server)
        .create_order(&CheckoutRequest {
            payment_method: "vnpay".into(),
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.order_id(), Some("ord_9"));
    assert_eq!(reply.payment_url(), Some("https://gateway.example/pay/123"));
}

#[tokio::test]
async fn create_order_accepts_a_plain_order_reply() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/orders");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"id": "ord_7", "status": "pending", "totalAmount": 10.0}));
        })
        .await;

    let reply = api_for(&server)
        .create_order(&CheckoutRequest {
            payment_method: "simulate".into(),
        })
        .await
        .unwrap();

    assert_eq!(reply.order_id(), Some("ord_7"));
    assert_eq!(reply.payment_url(), None);
    assert_eq!(reply.order().unwrap().status, OrderStatus::Pending);
}

#[tokio::test]
async fn pay_order_returns_the_settled_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/orders/ord_7/pay");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"id": "ord_7", "status": "paid", "totalAmount": 10.0}));
        })
        .await;

    let order = api_for(&server).pay_order(&order_id("ord_7")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(order.status, OrderStatus::Paid);
}

// ── 4. construction misuse fails fast ──────────────────────────────────────

#[tokio::test]
async fn empty_base_url_is_rejected() {
    let err = StoreApi::new("   ", None).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}
