use actix_web::{http::StatusCode, test, test::TestRequest};
use backoffice_engine::db_types::{SalesLineItem, SalesOrder, SalesUpdate};
use serde_json::json;

use super::helpers::*;
use crate::{helpers::calculate_hmac, middleware::SHOPIFY_HMAC_HEADER, shopify_routes::SHOPIFY_WEBHOOK_ID_HEADER};

const WEBHOOK_PATH: &str = "/api/webhooks/shopify-sales";

fn order_payload() -> String {
    json!({
        "id": 820982911946154508_i64,
        "email": "jon@example.com",
        "line_items": [
            {"id": 1, "product_id": 632910392, "quantity": 2, "title": "IPod Nano"},
            {"id": 2, "product_id": null, "quantity": 1, "title": "Gift wrapping"},
            {"id": 3, "product_id": 921728736, "quantity": 1, "title": "IPod Touch"}
        ]
    })
    .to_string()
}

fn signed(body: &str) -> TestRequest {
    let signature = calculate_hmac(TEST_WEBHOOK_SECRET, body.as_bytes()).unwrap();
    TestRequest::post()
        .uri(WEBHOOK_PATH)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((SHOPIFY_HMAC_HEADER, signature))
        .set_payload(body.to_string())
}

#[actix_web::test]
async fn signed_order_updates_sales() {
    let mut backends = TestBackends::default();
    backends.sales.expect_apply_order_sales().times(1).returning(|order: &SalesOrder| {
        assert_eq!(order.order_id, 820982911946154508);
        assert_eq!(order.delivery_id.as_deref(), Some("b54557e4-bdd9-4b37-8a5f-bf7d70bcd043"));
        assert_eq!(order.line_items, vec![
            SalesLineItem { product_id: 632910392, quantity: 2 },
            SalesLineItem { product_id: 921728736, quantity: 1 },
        ]);
        Ok(SalesUpdate::Applied { products_updated: 1, products_not_found: 1 })
    });
    let req = signed(&order_payload()).insert_header((SHOPIFY_WEBHOOK_ID_HEADER, "b54557e4-bdd9-4b37-8a5f-bf7d70bcd043"));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::OK, "{}", res.body);
    assert_eq!(
        res.json(),
        json!({"message": "Webhook processed", "orderId": 820982911946154508_i64, "productsUpdated": 1, "productsFailed": 2})
    );
}

#[actix_web::test]
async fn repeated_delivery_is_acknowledged() {
    let mut backends = TestBackends::default();
    backends.sales.expect_apply_order_sales().returning(|_| Ok(SalesUpdate::DuplicateDelivery));
    let req = signed(&order_payload()).insert_header((SHOPIFY_WEBHOOK_ID_HEADER, "d-1"));
    let res = send(backends, req).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Webhook already processed");
    assert_eq!(res.json()["productsUpdated"], 0);
}

#[actix_web::test]
async fn bad_signatures_are_rejected() {
    let body = order_payload();
    let wrong_key = calculate_hmac("not-the-webhook-secret", body.as_bytes()).unwrap();
    let other_body = calculate_hmac(TEST_WEBHOOK_SECRET, b"{}").unwrap();
    for signature in [None, Some("".to_string()), Some("bm9wZQ==".to_string()), Some(wrong_key), Some(other_body)] {
        let mut backends = TestBackends::default();
        backends.sales.expect_apply_order_sales().never();
        let mut req = TestRequest::post().uri(WEBHOOK_PATH).set_payload(body.clone());
        if let Some(sig) = &signature {
            req = req.insert_header((SHOPIFY_HMAC_HEADER, sig.as_str()));
        }
        let res = send(backends, req).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{signature:?}");
        assert_eq!(res.body, r#"{"error":"Authentication Error. Invalid webhook signature."}"#);
    }
}

#[actix_web::test]
async fn signed_garbage_is_a_bad_request() {
    let mut backends = TestBackends::default();
    backends.sales.expect_apply_order_sales().never();
    let res = send(backends, signed("this is not json")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn order_without_line_items() {
    let mut backends = TestBackends::default();
    backends.sales.expect_apply_order_sales().never();
    let res = send(backends, signed(r#"{"id": 5, "line_items": []}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body, r#"{"error":"The order contains no products"}"#);
}

#[actix_web::test]
async fn webhooks_are_not_rate_limited() {
    let mut backends = TestBackends::default().with_rate_limit(0);
    backends.sales.expect_apply_order_sales().returning(|_| Ok(SalesUpdate::Applied { products_updated: 2, products_not_found: 0 }));
    let app = test_service(backends).await;
    for _ in 0..3 {
        let res = test::call_service(&app, signed(&order_payload()).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = test::call_service(&app, TestRequest::get().uri("/api/products").to_request()).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
}
